//! `insight` command-line entry point.

pub mod cli;
pub mod logging;
pub mod output;
pub mod run;

use clap::Parser;
use insight_error::RunError;
use insight_workflow::{DataInsightWorkflowFactory, FileConfigLoader};
use output::ConsoleReporter;
use run::{LogFacade, RunInsightCommand};
use std::process::ExitCode;

pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();
    let log_settings = logging::LogSettings::from_env(cli.forced_level());
    logging::init(&log_settings);

    let loader = FileConfigLoader;
    let factory = DataInsightWorkflowFactory::new().apply_logger_level(!log_settings.is_pinned());
    let mut reporter = ConsoleReporter::stdio();

    let result = RunInsightCommand {
        loader: &loader,
        factory: &factory,
        reporter: &mut reporter,
        log: &LogFacade,
    }
    .run(&cli.config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Init errors were already printed by the reporter.
            if !matches!(e, RunError::Init(_)) {
                log::error!("❌ {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
