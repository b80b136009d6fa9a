//! CLI argument parsing for insight

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "insight", version)]
#[command(about = "📊 Run the OpenMetadata Data Insight workflow")]
#[command(long_about = "📊 Run the OpenMetadata Data Insight workflow\n\n\
    Loads a JSON or YAML workflow config, runs the Data Insight workflow once,\n\
    prints a status summary and exits non-zero if anything failed.")]
pub struct Cli {
    /// Path to the workflow config file (JSON or YAML)
    #[arg(short = 'c', long = "config", value_name = "CONFIG_PATH", value_parser = NonEmptyStringValueParser::new())]
    pub config: String,

    /// Log level; overrides workflowConfig.loggerLevel
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Shortcut for --log-level debug
    #[arg(long, conflicts_with = "log_level")]
    pub debug: bool,
}

impl Cli {
    /// Level forced from the command line, if any.
    pub fn forced_level(&self) -> Option<LevelFilter> {
        if self.debug {
            return Some(LevelFilter::Debug);
        }
        self.log_level.map(LevelFilter::from)
    }
}
