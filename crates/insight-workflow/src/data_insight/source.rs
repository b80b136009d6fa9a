use super::client::MetadataApi;
use super::entity::EntityType;
use crate::status::StepStatus;
use insight_error::ExecutionError;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Upper bound on pages per entity type.
const MAX_PAGES: usize = 10_000;

pub struct FetchedEntity {
    pub entity_type: EntityType,
    pub value: Value,
}

pub struct DataInsightSource {
    api: Arc<dyn MetadataApi>,
    entities: Vec<EntityType>,
    pub(super) status: StepStatus,
}

impl DataInsightSource {
    pub fn new(api: Arc<dyn MetadataApi>, entities: Vec<EntityType>) -> Self {
        Self {
            api,
            entities,
            status: StepStatus::default(),
        }
    }

    /// Fails hard when the server cannot be reached at all.
    pub fn preflight(&self, server: &str) -> Result<String, ExecutionError> {
        let version = self
            .api
            .server_version()
            .map_err(|e| ExecutionError::ServerUnreachable {
                url: server.to_string(),
                reason: format!("{e:#}"),
            })?;
        info!("🔌 Connected to OpenMetadata {} at {}", version, server);
        Ok(version)
    }

    /// Read every configured entity type. A failing page is recorded against
    /// that entity type and the next type is tried.
    pub fn fetch_all(&mut self) -> Vec<FetchedEntity> {
        let mut out = Vec::new();
        for entity_type in self.entities.clone() {
            match self.fetch_type(entity_type, &mut out) {
                Ok(count) => debug!("Fetched {} {} entities", count, entity_type),
                Err(e) => {
                    warn!("Failed to list {}: {:#}", entity_type.endpoint(), e);
                    self.status.failed(entity_type.endpoint(), format!("{e:#}"));
                }
            }
        }
        out
    }

    fn fetch_type(
        &mut self,
        entity_type: EntityType,
        out: &mut Vec<FetchedEntity>,
    ) -> anyhow::Result<usize> {
        let mut cursor: Option<String> = None;
        let mut count = 0;
        for _ in 0..MAX_PAGES {
            let page = self.api.list_entities(entity_type, cursor.as_deref())?;
            for value in page.data.iter().cloned() {
                self.status.scanned(entity_label(entity_type, &value));
                out.push(FetchedEntity { entity_type, value });
                count += 1;
            }
            match page.next_cursor() {
                Some(next) if cursor.as_deref() != Some(next) => cursor = Some(next.to_string()),
                _ => return Ok(count),
            }
        }
        anyhow::bail!("more than {MAX_PAGES} pages of {}", entity_type.endpoint())
    }
}

pub fn entity_label(entity_type: EntityType, value: &Value) -> String {
    let name = value
        .get("fullyQualifiedName")
        .or_else(|| value.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>");
    format!("{}:{}", entity_type.endpoint(), name)
}
