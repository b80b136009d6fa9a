use crate::config::ConfigMapping;
use crate::status::{overall_success_pct, StepSummary, WorkflowResult};
use insight_error::{ConstructionResult, ExecutionError, WorkflowStatusError};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowType {
    Insight,
}

impl WorkflowType {
    pub fn name(self) -> &'static str {
        match self {
            WorkflowType::Insight => "insight",
        }
    }

    pub fn docs_url(self) -> &'static str {
        match self {
            WorkflowType::Insight => {
                "https://docs.open-metadata.org/connectors/ingestion/workflows/data-insight"
            }
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit of work with an `execute` -> `stop` lifecycle and a status that can
/// be inspected after the run.
pub trait Workflow {
    fn workflow_type(&self) -> WorkflowType;

    /// Resolved configuration, for diagnostics.
    fn config(&self) -> &dyn fmt::Debug;

    fn execute(&mut self) -> Result<(), ExecutionError>;

    fn stop(&mut self);

    /// Step statuses in pipeline order.
    fn steps(&self) -> Vec<StepSummary<'_>>;

    /// Wall time between the start of `execute` and `stop`, once stopped.
    fn elapsed(&self) -> Option<Duration>;

    fn result_status(&self) -> WorkflowResult {
        let steps = self.steps();
        if steps.iter().any(|s| s.status.has_failures()) {
            WorkflowResult::Failure
        } else if steps.iter().any(|s| !s.status.warnings.is_empty()) {
            WorkflowResult::Warnings
        } else {
            WorkflowResult::Success
        }
    }

    fn success_pct(&self) -> f64 {
        overall_success_pct(&self.steps())
    }

    /// Turn failures recorded by the steps into an error, even though
    /// `execute` itself returned `Ok`.
    fn raise_from_status(&self, raise_warnings: bool) -> Result<(), WorkflowStatusError> {
        for step in self.steps() {
            if step.status.has_failures() {
                return Err(WorkflowStatusError::Failures {
                    step: step.name.to_string(),
                    count: step.status.failures.len(),
                });
            }
            if raise_warnings && !step.status.warnings.is_empty() {
                return Err(WorkflowStatusError::Warnings {
                    step: step.name.to_string(),
                    count: step.status.warnings.len(),
                });
            }
        }
        Ok(())
    }
}

pub trait WorkflowFactory {
    fn create(&self, config: ConfigMapping) -> ConstructionResult<Box<dyn Workflow>>;
}
