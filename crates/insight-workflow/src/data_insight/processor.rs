//! Aggregates raw entities into `EntityReportData` records.

use super::entity::{EntityReportData, ReportData, ReportDataType};
use super::source::{entity_label, FetchedEntity};
use crate::status::StepStatus;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

const DAY_MS: u64 = 86_400_000;
const TIER_PREFIX: &str = "Tier.";

type GroupKey = (String, Option<String>, Option<String>, Option<String>);

#[derive(Default)]
pub struct EntityReportDataProcessor {
    pub(super) status: StepStatus,
}

impl EntityReportDataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group entities by (type, service, tier, team). Output order is stable.
    pub fn process(&mut self, entities: &[FetchedEntity], timestamp: u64) -> Vec<ReportData> {
        let mut groups: BTreeMap<GroupKey, EntityReportData> = BTreeMap::new();

        for entity in entities {
            let label = entity_label(entity.entity_type, &entity.value);
            if !has_name(&entity.value) {
                self.status.filter(label);
                continue;
            }

            let tier = match entity.value.get("tags") {
                None | Some(Value::Null) => None,
                Some(Value::Array(tags)) => tier_of(tags),
                Some(_) => {
                    self.status.warning(&label, "tags is not a list; tier ignored");
                    None
                }
            };
            let team = team_of(&entity.value);
            let service = service_of(&entity.value);
            let key = (
                entity.entity_type.report_name().to_string(),
                service.clone(),
                tier.clone(),
                team.clone(),
            );
            let row = groups.entry(key).or_insert_with(|| EntityReportData {
                entity_type: entity.entity_type.report_name().to_string(),
                service_name: service,
                entity_tier: tier,
                team,
                ..Default::default()
            });

            row.entity_count += 1;
            if has_description(&entity.value) {
                row.completed_descriptions += 1;
            } else {
                row.missing_descriptions += 1;
            }
            if has_owner(&entity.value) {
                row.has_owner += 1;
            } else {
                row.missing_owner += 1;
            }
            self.status.scanned(label);
        }

        groups
            .into_values()
            .map(|data| ReportData {
                timestamp,
                report_data_type: ReportDataType::EntityReportData,
                data,
            })
            .collect()
    }
}

/// Midnight UTC of the current day, in epoch millis.
pub fn report_timestamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    midnight_utc(now)
}

pub fn midnight_utc(epoch_ms: u64) -> u64 {
    epoch_ms - epoch_ms % DAY_MS
}

fn has_name(value: &Value) -> bool {
    ["fullyQualifiedName", "name"]
        .iter()
        .any(|k| value.get(*k).and_then(Value::as_str).is_some_and(|s| !s.is_empty()))
}

fn has_description(value: &Value) -> bool {
    value
        .get("description")
        .and_then(Value::as_str)
        .is_some_and(|d| !d.trim().is_empty())
}

fn has_owner(value: &Value) -> bool {
    let single = value.get("owner").is_some_and(|o| o.is_object());
    let many = value
        .get("owners")
        .and_then(Value::as_array)
        .is_some_and(|o| !o.is_empty());
    single || many
}

fn owner_refs(value: &Value) -> Vec<&Value> {
    let mut refs: Vec<&Value> = value
        .get("owner")
        .filter(|o| o.is_object())
        .into_iter()
        .collect();
    if let Some(owners) = value.get("owners").and_then(Value::as_array) {
        refs.extend(owners.iter());
    }
    refs
}

fn team_of(value: &Value) -> Option<String> {
    owner_refs(value)
        .into_iter()
        .find(|o| o.get("type").and_then(Value::as_str) == Some("team"))
        .and_then(|o| o.get("name").and_then(Value::as_str))
        .map(str::to_string)
}

/// Name of the `service` entity reference.
fn service_of(value: &Value) -> Option<String> {
    let service = value.get("service")?;
    service
        .get("name")
        .or_else(|| service.get("fullyQualifiedName"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn tier_of(tags: &[Value]) -> Option<String> {
    tags.iter()
        .filter_map(|t| t.get("tagFQN").and_then(Value::as_str))
        .find(|fqn| fqn.starts_with(TIER_PREFIX))
        .map(str::to_string)
}
