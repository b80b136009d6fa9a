use insight_error::ConstructionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Table,
    Topic,
    Dashboard,
    Pipeline,
    MlModel,
    Container,
    Chart,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Table,
        EntityType::Topic,
        EntityType::Dashboard,
        EntityType::Pipeline,
        EntityType::MlModel,
        EntityType::Container,
        EntityType::Chart,
    ];

    /// REST collection under `/v1/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityType::Table => "tables",
            EntityType::Topic => "topics",
            EntityType::Dashboard => "dashboards",
            EntityType::Pipeline => "pipelines",
            EntityType::MlModel => "mlmodels",
            EntityType::Container => "containers",
            EntityType::Chart => "charts",
        }
    }

    /// Name used in report data (`entityType`).
    pub fn report_name(self) -> &'static str {
        match self {
            EntityType::Table => "Table",
            EntityType::Topic => "Topic",
            EntityType::Dashboard => "Dashboard",
            EntityType::Pipeline => "Pipeline",
            EntityType::MlModel => "MlModel",
            EntityType::Container => "Container",
            EntityType::Chart => "Chart",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_name())
    }
}

impl FromStr for EntityType {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityType::ALL
            .into_iter()
            .find(|e| {
                e.report_name().to_ascii_lowercase() == wanted || e.endpoint() == wanted
            })
            .ok_or_else(|| ConstructionError::UnknownEntity(s.to_string()))
    }
}

/// One page of a paginated entity listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl EntityPage {
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.after.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportDataType {
    EntityReportData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub timestamp: u64,
    pub report_data_type: ReportDataType,
    pub data: EntityReportData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReportData {
    pub entity_type: String,
    pub service_name: Option<String>,
    pub entity_tier: Option<String>,
    pub team: Option<String>,
    pub completed_descriptions: u64,
    pub missing_descriptions: u64,
    pub has_owner: u64,
    pub missing_owner: u64,
    pub entity_count: u64,
}

impl ReportData {
    /// Short label used in step statuses.
    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.data.entity_type,
            self.data.service_name.as_deref().unwrap_or("NoService"),
            self.data.entity_tier.as_deref().unwrap_or("NoTier"),
            self.data.team.as_deref().unwrap_or("NoTeam")
        )
    }
}
