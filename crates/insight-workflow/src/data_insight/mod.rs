//! The Data Insight workflow: read entities from OpenMetadata, aggregate them
//! into report data, and write the report data to a sink.

mod client;
mod entity;
mod processor;
mod sink;
mod source;

pub use client::{validate_host_port, MetadataApi, OpenMetadataClient, PAGE_LIMIT};
pub use entity::{EntityPage, EntityReportData, EntityType, Paging, ReportData, ReportDataType};
pub use processor::{midnight_utc, report_timestamp, EntityReportDataProcessor};
pub use sink::{FileSink, MetadataRestSink, ReportSink};
pub use source::{DataInsightSource, FetchedEntity};

use crate::config::{ConfigMapping, InsightWorkflowConfig};
use crate::status::{StepStatus, StepSummary};
use crate::workflow::{Workflow, WorkflowFactory, WorkflowType};
use insight_error::{ConstructionError, ConstructionResult, ExecutionError};
use log::{info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SOURCE_TYPE: &str = "dataInsight";
pub const PROCESSOR_TYPE: &str = "data-insight-processor";

pub struct DataInsightWorkflow {
    config: InsightWorkflowConfig,
    server: String,
    source: DataInsightSource,
    processor: EntityReportDataProcessor,
    sink: Box<dyn ReportSink>,
    sink_status: StepStatus,
    started: Option<Instant>,
    elapsed: Option<Duration>,
    executed: bool,
}

impl DataInsightWorkflow {
    /// Validate the mapping and wire the steps against a live server client.
    pub fn create(mapping: ConfigMapping) -> ConstructionResult<Self> {
        let config = parse_config(mapping)?;
        validate_steps(&config)?;
        let client = OpenMetadataClient::new(&config.workflow_config.open_metadata_server_config)?;
        let server = client.base_url().to_string();
        Self::assemble(config, server, Arc::new(client))
    }

    /// Wire the steps against any [`MetadataApi`].
    pub fn with_api(
        config: InsightWorkflowConfig,
        api: Arc<dyn MetadataApi>,
    ) -> ConstructionResult<Self> {
        validate_steps(&config)?;
        let server =
            validate_host_port(&config.workflow_config.open_metadata_server_config.host_port)?;
        Self::assemble(config, server, api)
    }

    fn assemble(
        config: InsightWorkflowConfig,
        server: String,
        api: Arc<dyn MetadataApi>,
    ) -> ConstructionResult<Self> {
        let entities = selected_entities(&config)?;

        let sink: Box<dyn ReportSink> = match config.sink.sink_type.as_str() {
            "file" => {
                let path = config
                    .sink
                    .config
                    .path
                    .clone()
                    .ok_or(ConstructionError::MissingField("sink.config.path"))?;
                Box::new(FileSink::new(path))
            }
            "metadata-rest" => Box::new(MetadataRestSink::new(Arc::clone(&api))),
            other => return Err(ConstructionError::UnsupportedSink(other.to_string())),
        };

        Ok(Self {
            source: DataInsightSource::new(api, entities),
            processor: EntityReportDataProcessor::new(),
            sink,
            sink_status: StepStatus::default(),
            server,
            config,
            started: None,
            elapsed: None,
            executed: false,
        })
    }
}

pub fn parse_config(mapping: ConfigMapping) -> ConstructionResult<InsightWorkflowConfig> {
    Ok(serde_json::from_value(serde_json::Value::Object(mapping))?)
}

fn validate_steps(config: &InsightWorkflowConfig) -> ConstructionResult<()> {
    if config.source.source_type != SOURCE_TYPE {
        return Err(ConstructionError::UnsupportedSource(
            config.source.source_type.clone(),
        ));
    }
    if config.processor.processor_type != PROCESSOR_TYPE {
        return Err(ConstructionError::UnsupportedProcessor(
            config.processor.processor_type.clone(),
        ));
    }
    Ok(())
}

fn selected_entities(config: &InsightWorkflowConfig) -> ConstructionResult<Vec<EntityType>> {
    match &config.source.source_config.config.entities {
        None => Ok(EntityType::ALL.to_vec()),
        Some(names) => {
            let mut out: Vec<EntityType> = Vec::new();
            for name in names {
                let entity = name.parse::<EntityType>()?;
                if !out.contains(&entity) {
                    out.push(entity);
                }
            }
            Ok(out)
        }
    }
}

impl Workflow for DataInsightWorkflow {
    fn workflow_type(&self) -> WorkflowType {
        WorkflowType::Insight
    }

    fn config(&self) -> &dyn fmt::Debug {
        &self.config
    }

    fn execute(&mut self) -> Result<(), ExecutionError> {
        if self.executed {
            return Err(ExecutionError::AlreadyExecuted);
        }
        self.executed = true;
        self.started = Some(Instant::now());
        info!("📊 Running Data Insight workflow against {}", self.server);

        self.source.preflight(&self.server)?;
        self.sink.prepare()?;

        let entities = self.source.fetch_all();
        let records = self.processor.process(&entities, report_timestamp());
        info!(
            "Aggregated {} entities into {} report records",
            entities.len(),
            records.len()
        );
        sink::write_all(self.sink.as_mut(), &records, &mut self.sink_status);
        Ok(())
    }

    fn stop(&mut self) {
        if self.elapsed.is_some() {
            return;
        }
        if let Err(e) = self.sink.close() {
            warn!("Failed to close {} sink: {:#}", self.sink.name(), e);
            self.sink_status
                .failed(self.sink.name(), format!("close failed: {e:#}"));
        }
        self.elapsed = Some(self.started.map(|s| s.elapsed()).unwrap_or_default());
    }

    fn steps(&self) -> Vec<StepSummary<'_>> {
        vec![
            StepSummary {
                name: "Source",
                status: &self.source.status,
            },
            StepSummary {
                name: "Processor",
                status: &self.processor.status,
            },
            StepSummary {
                name: "Sink",
                status: &self.sink_status,
            },
        ]
    }

    fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// Builds [`DataInsightWorkflow`]s for the insight command.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataInsightWorkflowFactory {
    apply_logger_level: bool,
}

impl DataInsightWorkflowFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `workflowConfig.loggerLevel` becomes the process log level.
    pub fn apply_logger_level(mut self, apply: bool) -> Self {
        self.apply_logger_level = apply;
        self
    }
}

impl WorkflowFactory for DataInsightWorkflowFactory {
    fn create(&self, config: ConfigMapping) -> ConstructionResult<Box<dyn Workflow>> {
        let workflow = DataInsightWorkflow::create(config)?;
        if self.apply_logger_level {
            log::set_max_level(workflow.config.workflow_config.logger_level.to_level_filter());
        }
        Ok(Box::new(workflow))
    }
}
