//! Insight workflow orchestration.
//!
//! This crate holds the config loader, the [`Workflow`] lifecycle trait, and
//! the Data Insight workflow that reads entities from OpenMetadata and writes
//! aggregated report data to a sink. Command crates drive workflows through
//! the traits here and never depend on a concrete workflow type.

pub mod config;
pub mod data_insight;
pub mod status;
pub mod workflow;

pub use config::{load_config_file, ConfigLoader, ConfigMapping, FileConfigLoader};
pub use data_insight::{DataInsightWorkflow, DataInsightWorkflowFactory};
pub use status::{StepFailure, StepStatus, StepSummary, WorkflowResult};
pub use workflow::{Workflow, WorkflowFactory, WorkflowType};
