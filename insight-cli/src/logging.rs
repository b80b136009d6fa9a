use log::LevelFilter;

/// Where the process log level comes from: `--log-level`/`--debug` first,
/// then `RUST_LOG`, then `workflowConfig.loggerLevel` once the workflow exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    cli_level: Option<LevelFilter>,
    rust_log: Option<String>,
}

impl LogSettings {
    pub fn from_env(cli_level: Option<LevelFilter>) -> Self {
        Self::new(cli_level, std::env::var("RUST_LOG").ok())
    }

    pub fn new(cli_level: Option<LevelFilter>, rust_log: Option<String>) -> Self {
        Self {
            cli_level,
            rust_log: rust_log.filter(|spec| !spec.trim().is_empty()),
        }
    }

    /// Whether the operator pinned the level (flag or `RUST_LOG`).
    pub fn is_pinned(&self) -> bool {
        self.cli_level.is_some() || self.rust_log.is_some()
    }

    /// A CLI level ignores `RUST_LOG`. Without one, `RUST_LOG` directives
    /// are used as given. Otherwise the backend accepts everything and the
    /// `log` max level does the gating.
    pub fn builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match (self.cli_level, self.rust_log.as_deref()) {
            (None, Some(spec)) => {
                builder.parse_filters(spec);
            }
            _ => {
                builder.filter_level(LevelFilter::Trace);
            }
        }
        builder
    }

    /// Max level right after init. `None` keeps the one derived from `RUST_LOG`.
    pub fn initial_max_level(&self) -> Option<LevelFilter> {
        match (self.cli_level, &self.rust_log) {
            (Some(level), _) => Some(level),
            (None, None) => Some(LevelFilter::Info),
            (None, Some(_)) => None,
        }
    }
}

/// Install the env_logger backend. Call once per process.
pub fn init(settings: &LogSettings) {
    settings.builder().init();
    if let Some(level) = settings.initial_max_level() {
        log::set_max_level(level);
    }
}
