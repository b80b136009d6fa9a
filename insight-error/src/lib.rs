use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type LoaderResult<T> = Result<T, LoaderError>;
pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Failures while turning a config path into a config mapping.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config file {path} must contain a mapping at the top level, found {found}")]
    NotAMapping { path: PathBuf, found: &'static str },
}

/// Failures while building a workflow from an already-parsed mapping.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("Invalid workflow configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported source type '{0}' for a Data Insight workflow (expected 'dataInsight')")]
    UnsupportedSource(String),

    #[error("Unsupported processor type '{0}' (expected 'data-insight-processor')")]
    UnsupportedProcessor(String),

    #[error("Unsupported sink type '{0}' (expected 'file' or 'metadata-rest')")]
    UnsupportedSink(String),

    #[error("Invalid hostPort '{host_port}': {reason}")]
    InvalidHostPort { host_port: String, reason: String },

    #[error("authProvider 'openmetadata' requires securityConfig.jwtToken")]
    MissingJwtToken,

    #[error("Unknown entity type '{0}'")]
    UnknownEntity(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Everything that can go wrong before a workflow instance exists.
#[derive(Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Hard failures raised out of `execute()`.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("OpenMetadata server at {url} is unreachable: {reason}")]
    ServerUnreachable { url: String, reason: String },

    #[error("Workflow already executed")]
    AlreadyExecuted,

    #[error("Sink I/O error: {0}")]
    SinkIo(#[from] io::Error),
}

/// Soft failures recorded by the workflow steps and surfaced after the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatusError {
    #[error("{step} reported {count} failure(s)")]
    Failures { step: String, count: usize },

    #[error("{step} reported {count} warning(s)")]
    Warnings { step: String, count: usize },
}

/// Terminal outcome of the insight command.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Workflow initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("Workflow execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Workflow finished with errors: {0}")]
    Status(#[from] WorkflowStatusError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Init(_) => 1,
            RunError::Execution(_) => 2,
            RunError::Status(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_tier() {
        let init = RunError::from(InitError::from(ConstructionError::MissingJwtToken));
        let exec = RunError::from(ExecutionError::AlreadyExecuted);
        let status = RunError::from(WorkflowStatusError::Failures {
            step: "Sink".to_string(),
            count: 2,
        });
        assert_eq!(init.exit_code(), 1);
        assert_eq!(exec.exit_code(), 2);
        assert_eq!(status.exit_code(), 3);
    }

    #[test]
    fn init_error_is_transparent() {
        let err = InitError::from(ConstructionError::UnsupportedSink("kafka".to_string()));
        assert_eq!(
            err.to_string(),
            "Unsupported sink type 'kafka' (expected 'file' or 'metadata-rest')"
        );
    }
}
