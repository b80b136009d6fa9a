//! Per-step bookkeeping of what a workflow step read, skipped, or failed on.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepStatus {
    pub records: Vec<String>,
    pub warnings: Vec<String>,
    pub filtered: Vec<String>,
    pub failures: Vec<StepFailure>,
}

impl StepStatus {
    pub fn scanned(&mut self, record: impl Into<String>) {
        self.records.push(record.into());
    }

    pub fn warning(&mut self, name: impl AsRef<str>, message: impl AsRef<str>) {
        self.warnings
            .push(format!("{}: {}", name.as_ref(), message.as_ref()));
    }

    pub fn filter(&mut self, name: impl Into<String>) {
        self.filtered.push(name.into());
    }

    pub fn failed(&mut self, name: impl Into<String>, error: impl ToString) {
        self.failures.push(StepFailure {
            name: name.into(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn success_pct(&self) -> f64 {
        let total = self.records.len() + self.failures.len();
        if total == 0 {
            return 100.0;
        }
        self.records.len() as f64 * 100.0 / total as f64
    }
}

/// Borrowed view of one step's status, in pipeline order.
#[derive(Debug, Clone, Copy)]
pub struct StepSummary<'a> {
    pub name: &'static str,
    pub status: &'a StepStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowResult {
    Success,
    Warnings,
    Failure,
}

pub fn overall_success_pct(steps: &[StepSummary<'_>]) -> f64 {
    let records: usize = steps.iter().map(|s| s.status.records.len()).sum();
    let failures: usize = steps.iter().map(|s| s.status.failures.len()).sum();
    if records + failures == 0 {
        return 100.0;
    }
    records as f64 * 100.0 / (records + failures) as f64
}
