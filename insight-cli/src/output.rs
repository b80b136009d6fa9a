//! Human-readable reporting shared by the workflow commands.

use insight_error::{ConstructionError, InitError};
use insight_workflow::config::source_type_of;
use insight_workflow::{ConfigMapping, StepSummary, Workflow, WorkflowResult, WorkflowType};
use std::io::{self, Stderr, Stdout, Write};
use std::time::Duration;

const SLACK_URL: &str = "https://slack.open-metadata.org/";

pub trait StatusReporter {
    fn print_init_error(
        &mut self,
        error: &InitError,
        config: Option<&ConfigMapping>,
        workflow_type: WorkflowType,
    );

    fn print_data_insight_status(&mut self, workflow: &dyn Workflow);
}

/// Status goes to `out`, initialization errors to `err`.
pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleReporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_init_error(
        &mut self,
        error: &InitError,
        config: Option<&ConfigMapping>,
        workflow_type: WorkflowType,
    ) -> io::Result<()> {
        let w = &mut self.err;
        match error {
            InitError::Loader(e) => {
                writeln!(w, "\n❌ Error loading {} configuration: {}", workflow_type, e)?;
            }
            InitError::Construction(e) => {
                let source_type = config.and_then(source_type_of).unwrap_or("<unknown>");
                writeln!(
                    w,
                    "\n❌ Error initializing {} workflow (source type: {}): {}",
                    workflow_type, source_type, e
                )?;
                if matches!(e, ConstructionError::InvalidConfig(_)) {
                    writeln!(
                        w,
                        "The configuration does not match the {} workflow schema.",
                        workflow_type
                    )?;
                }
            }
        }
        writeln!(
            w,
            "\nFor more information, please visit: {}\nOr join us in Slack: {}",
            workflow_type.docs_url(),
            SLACK_URL
        )?;
        w.flush()
    }

    fn write_status(&mut self, workflow: &dyn Workflow) -> io::Result<()> {
        let w = &mut self.out;
        writeln!(w, "\nWorkflow Data Insight Summary:")?;
        for step in workflow.steps() {
            write_step(w, &step)?;
        }
        writeln!(w, "Success %: {:.2}", workflow.success_pct())?;
        if let Some(elapsed) = workflow.elapsed() {
            writeln!(w, "Workflow finished in {}", format_duration(elapsed))?;
        }
        let verdict = match workflow.result_status() {
            WorkflowResult::Success => "✅ Workflow finished successfully",
            WorkflowResult::Warnings => "⚠️  Workflow finished with warnings",
            WorkflowResult::Failure => "❌ Workflow finished with failures",
        };
        writeln!(w, "{}", verdict)?;
        w.flush()
    }
}

fn write_step(w: &mut impl Write, step: &StepSummary<'_>) -> io::Result<()> {
    let status = step.status;
    writeln!(
        w,
        "  {:<10} Processed records: {} | Filtered: {} | Warnings: {} | Errors: {}",
        format!("{}:", step.name),
        status.records.len(),
        status.filtered.len(),
        status.warnings.len(),
        status.failures.len()
    )?;
    for warning in &status.warnings {
        writeln!(w, "    ⚠ {}", warning)?;
    }
    for failure in &status.failures {
        writeln!(w, "    ✗ {}: {}", failure.name, failure.error)?;
    }
    Ok(())
}

impl<O: Write, E: Write> StatusReporter for ConsoleReporter<O, E> {
    fn print_init_error(
        &mut self,
        error: &InitError,
        config: Option<&ConfigMapping>,
        workflow_type: WorkflowType,
    ) {
        if let Err(e) = self.write_init_error(error, config, workflow_type) {
            log::warn!("Failed to print initialization error: {}", e);
        }
    }

    fn print_data_insight_status(&mut self, workflow: &dyn Workflow) {
        if let Err(e) = self.write_status(workflow) {
            log::warn!("Failed to print workflow status: {}", e);
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total < 60 {
        return format!("{:.2}s", d.as_secs_f64());
    }
    let (hours, rem) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
