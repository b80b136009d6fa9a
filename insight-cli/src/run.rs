//! The `insight` command: load, build, execute, stop, report.

use crate::output::StatusReporter;
use insight_error::{InitError, RunError};
use insight_workflow::{ConfigLoader, ConfigMapping, WorkflowFactory, WorkflowType};
use std::path::Path;

/// Debug sink handed to the command instead of a module-level logger.
pub trait CommandLog {
    fn debug(&self, message: &str);
}

/// Forwards to the `log` facade under this module's target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl CommandLog for LogFacade {
    fn debug(&self, message: &str) {
        log::debug!("{}", message);
    }
}

pub struct RunInsightCommand<'a> {
    pub loader: &'a dyn ConfigLoader,
    pub factory: &'a dyn WorkflowFactory,
    pub reporter: &'a mut dyn StatusReporter,
    pub log: &'a dyn CommandLog,
}

impl RunInsightCommand<'_> {
    /// Run the Data Insight workflow described by `config_path` once.
    ///
    /// Initialization errors are reported here and returned as
    /// [`RunError::Init`]. An `execute` error is returned as is and `stop` is
    /// not called. Failures recorded in the step statuses surface as
    /// [`RunError::Status`] after the summary has been printed.
    pub fn run(&mut self, config_path: &str) -> Result<(), RunError> {
        let path = Path::new(config_path);

        let mapping = match self.loader.load(path) {
            Ok(mapping) => mapping,
            Err(e) => return Err(self.init_failed(e.into(), None)),
        };

        let mut workflow = match self.factory.create(mapping.clone()) {
            Ok(workflow) => workflow,
            Err(e) => return Err(self.init_failed(e.into(), Some(&mapping))),
        };

        self.log
            .debug(&format!("Using workflow config:\n{:#?}", workflow.config()));

        workflow.execute()?;
        workflow.stop();

        self.reporter.print_data_insight_status(workflow.as_ref());
        workflow.raise_from_status(false)?;
        Ok(())
    }

    fn init_failed(&mut self, error: InitError, config: Option<&ConfigMapping>) -> RunError {
        self.log.debug(&format!("{:?}", error));
        self.reporter
            .print_init_error(&error, config, WorkflowType::Insight);
        RunError::Init(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_error::{
        ConstructionError, ConstructionResult, ExecutionError, LoaderError, LoaderResult,
        WorkflowStatusError,
    };
    use insight_workflow::{StepStatus, StepSummary, Workflow};
    use serde_json::json;
    use std::cell::RefCell;
    use std::fmt;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::Duration;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn mapping() -> ConfigMapping {
        match json!({"source": {"type": "dataInsight"}}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    struct FakeLoader {
        calls: Calls,
        fail: bool,
    }

    impl ConfigLoader for FakeLoader {
        fn load(&self, path: &Path) -> LoaderResult<ConfigMapping> {
            self.calls.borrow_mut().push(format!("load {}", path.display()));
            if self.fail {
                return Err(LoaderError::NotAMapping {
                    path: PathBuf::from(path),
                    found: "a string",
                });
            }
            Ok(mapping())
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Outcome {
        Clean,
        ExecuteErrors,
        RecordsFailure,
    }

    struct FakeWorkflow {
        calls: Calls,
        outcome: Outcome,
        status: StepStatus,
    }

    impl Workflow for FakeWorkflow {
        fn workflow_type(&self) -> WorkflowType {
            WorkflowType::Insight
        }

        fn config(&self) -> &dyn fmt::Debug {
            &"fake-config"
        }

        fn execute(&mut self) -> Result<(), ExecutionError> {
            self.calls.borrow_mut().push("execute".into());
            match self.outcome {
                Outcome::Clean => self.status.scanned("tables:a"),
                Outcome::ExecuteErrors => {
                    return Err(ExecutionError::ServerUnreachable {
                        url: "http://localhost:8585/api".into(),
                        reason: "connection refused".into(),
                    })
                }
                Outcome::RecordsFailure => self.status.failed("tables", "HTTP 500"),
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.borrow_mut().push("stop".into());
        }

        fn steps(&self) -> Vec<StepSummary<'_>> {
            vec![StepSummary {
                name: "Source",
                status: &self.status,
            }]
        }

        fn elapsed(&self) -> Option<Duration> {
            None
        }
    }

    struct FakeFactory {
        calls: Calls,
        fail: bool,
        outcome: Outcome,
    }

    impl WorkflowFactory for FakeFactory {
        fn create(&self, _config: ConfigMapping) -> ConstructionResult<Box<dyn Workflow>> {
            self.calls.borrow_mut().push("create".into());
            if self.fail {
                return Err(ConstructionError::UnsupportedSink("kafka".into()));
            }
            Ok(Box::new(FakeWorkflow {
                calls: self.calls.clone(),
                outcome: self.outcome,
                status: StepStatus::default(),
            }))
        }
    }

    struct FakeReporter {
        calls: Calls,
        init_config: Option<Option<ConfigMapping>>,
        init_type: Option<WorkflowType>,
    }

    impl StatusReporter for FakeReporter {
        fn print_init_error(
            &mut self,
            error: &InitError,
            config: Option<&ConfigMapping>,
            workflow_type: WorkflowType,
        ) {
            assert!(!error.to_string().is_empty());
            self.calls.borrow_mut().push("print_init_error".into());
            self.init_config = Some(config.cloned());
            self.init_type = Some(workflow_type);
        }

        fn print_data_insight_status(&mut self, _workflow: &dyn Workflow) {
            self.calls.borrow_mut().push("print_status".into());
        }
    }

    struct FakeLog {
        calls: Calls,
    }

    impl CommandLog for FakeLog {
        fn debug(&self, message: &str) {
            self.calls.borrow_mut().push(format!("debug {}", message));
        }
    }

    struct Harness {
        calls: Calls,
        loader: FakeLoader,
        factory: FakeFactory,
        reporter: FakeReporter,
        log: FakeLog,
    }

    impl Harness {
        fn new(load_fails: bool, create_fails: bool, outcome: Outcome) -> Self {
            let calls: Calls = Rc::default();
            Self {
                loader: FakeLoader {
                    calls: calls.clone(),
                    fail: load_fails,
                },
                factory: FakeFactory {
                    calls: calls.clone(),
                    fail: create_fails,
                    outcome,
                },
                reporter: FakeReporter {
                    calls: calls.clone(),
                    init_config: None,
                    init_type: None,
                },
                log: FakeLog {
                    calls: calls.clone(),
                },
                calls,
            }
        }

        fn run(&mut self, path: &str) -> Result<(), RunError> {
            RunInsightCommand {
                loader: &self.loader,
                factory: &self.factory,
                reporter: &mut self.reporter,
                log: &self.log,
            }
            .run(path)
        }

        fn names(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|c| c.split(' ').next().unwrap_or_default().to_string())
                .collect()
        }
    }

    #[test]
    fn clean_run_goes_through_every_step_in_order() {
        let mut h = Harness::new(false, false, Outcome::Clean);
        h.run("ok.yaml").unwrap();
        assert_eq!(
            h.names(),
            ["load", "create", "debug", "execute", "stop", "print_status"]
        );
        assert_eq!(h.calls.borrow()[0], "load ok.yaml");
        assert!(h.calls.borrow()[2].contains("fake-config"));
    }

    #[test]
    fn loader_failure_short_circuits_with_no_config() {
        let mut h = Harness::new(true, false, Outcome::Clean);
        let err = h.run("bad.yaml").unwrap_err();

        assert!(matches!(err, RunError::Init(InitError::Loader(_))));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(h.names(), ["load", "debug", "print_init_error"]);
        assert_eq!(h.reporter.init_config, Some(None));
        assert_eq!(h.reporter.init_type, Some(WorkflowType::Insight));
    }

    #[test]
    fn construction_failure_reports_the_loaded_mapping() {
        let mut h = Harness::new(false, true, Outcome::Clean);
        let err = h.run("ok.yaml").unwrap_err();

        assert!(matches!(err, RunError::Init(InitError::Construction(_))));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(h.names(), ["load", "create", "debug", "print_init_error"]);
        assert_eq!(h.reporter.init_config, Some(Some(mapping())));
        assert!(!h.calls.borrow().iter().any(|c| c.contains("fake-config")));
    }

    #[test]
    fn recorded_failure_is_reported_then_raised() {
        let mut h = Harness::new(false, false, Outcome::RecordsFailure);
        let err = h.run("ok.yaml").unwrap_err();

        assert_eq!(
            h.names(),
            ["load", "create", "debug", "execute", "stop", "print_status"]
        );
        match err {
            RunError::Status(WorkflowStatusError::Failures { step, count }) => {
                assert_eq!(step, "Source");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn execute_error_propagates_without_stop_or_report() {
        let mut h = Harness::new(false, false, Outcome::ExecuteErrors);
        let err = h.run("ok.yaml").unwrap_err();

        assert!(matches!(err, RunError::Execution(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(h.names(), ["load", "create", "debug", "execute"]);
    }

    #[test]
    fn log_facade_accepts_messages() {
        LogFacade.debug("no logger installed");
    }
}
