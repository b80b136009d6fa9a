//! Workflow configuration: file loading and the typed Data Insight schema.
//!
//! Loading produces an untyped [`ConfigMapping`] so that callers can report
//! the raw document even when it does not match the schema. The typed
//! [`InsightWorkflowConfig`] is only built by the workflow factory.

use insight_error::{LoaderError, LoaderResult};
use log::{debug, LevelFilter};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed key/value document handed from the loader to the workflow factory.
pub type ConfigMapping = serde_json::Map<String, Value>;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("env var pattern is valid")
});

/// Source of config mappings. The file-backed loader is the only production
/// implementation; the seam exists so commands can be exercised without disk.
pub trait ConfigLoader {
    fn load(&self, path: &Path) -> LoaderResult<ConfigMapping>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigLoader;

impl ConfigLoader for FileConfigLoader {
    fn load(&self, path: &Path) -> LoaderResult<ConfigMapping> {
        load_config_file(path)
    }
}

/// Read a JSON or YAML config file, expanding `$VAR` / `${VAR}` references
/// from the environment before parsing.
pub fn load_config_file(path: &Path) -> LoaderResult<ConfigMapping> {
    let raw = fs::read_to_string(path).map_err(|source| LoaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let expanded = expand_env_vars(&raw);
    debug!("Loaded config file {}", path.display());
    parse_config_str(path, &expanded)
}

fn parse_config_str(path: &Path, content: &str) -> LoaderResult<ConfigMapping> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let value: Value = if is_json {
        serde_json::from_str(content).map_err(|source| LoaderError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(content).map_err(|source| LoaderError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoaderError::NotAMapping {
            path: path.to_path_buf(),
            found: value_kind(&other),
        }),
    }
}

/// Unknown variables are left untouched, matching shell `expandvars` rules.
pub fn expand_env_vars(input: &str) -> String {
    ENV_VAR
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Source type reported back to the operator when construction fails.
pub fn source_type_of(mapping: &ConfigMapping) -> Option<&str> {
    mapping.get("source")?.get("type")?.as_str()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightWorkflowConfig {
    pub source: SourceSection,
    pub processor: ProcessorSection,
    pub sink: SinkSection,
    pub workflow_config: WorkflowConfigSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSection {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub source_config: SourceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub config: DataInsightSourceConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataInsightSourceConfig {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Entity types to report on; all supported types when absent.
    #[serde(default)]
    pub entities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorSection {
    #[serde(rename = "type")]
    pub processor_type: String,
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkSection {
    #[serde(rename = "type")]
    pub sink_type: String,
    #[serde(default)]
    pub config: SinkConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfigSection {
    #[serde(default)]
    pub logger_level: LoggerLevel,
    pub open_metadata_server_config: ServerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoggerLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LoggerLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LoggerLevel::Debug => LevelFilter::Debug,
            LoggerLevel::Info => LevelFilter::Info,
            LoggerLevel::Warn => LevelFilter::Warn,
            LoggerLevel::Error => LevelFilter::Error,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub host_port: String,
    #[serde(default)]
    pub auth_provider: AuthProvider,
    #[serde(default)]
    pub security_config: Option<SecurityConfig>,
}

impl ServerConfig {
    pub fn jwt_token(&self) -> Option<&str> {
        self.security_config
            .as_ref()
            .and_then(|s| s.jwt_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AuthProvider {
    #[serde(rename = "openmetadata")]
    OpenMetadata,
    #[default]
    #[serde(rename = "no-auth")]
    NoAuth,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    #[serde(default)]
    pub jwt_token: Option<String>,
}

// Config is logged at debug level; keep the token out of the logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_token", &self.jwt_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
