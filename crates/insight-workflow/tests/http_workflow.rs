use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use insight_workflow::{
    load_config_file, DataInsightWorkflowFactory, WorkflowFactory, WorkflowResult,
};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, host_port: &str, sink: &str) -> std::path::PathBuf {
    let path = dir.join("insight.yaml");
    let content = format!(
        r#"
source:
  type: dataInsight
  serviceName: OpenMetadata
  sourceConfig:
    config:
      type: MetadataToElasticSearch
      entities: [table]
processor:
  type: data-insight-processor
  config: {{}}
sink:
{sink}
workflowConfig:
  openMetadataServerConfig:
    hostPort: {host_port}
    authProvider: openmetadata
    securityConfig:
      jwtToken: $INSIGHT_IT_TOKEN
"#
    );
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_and_runs_against_mock_server() {
    std::env::set_var("INSIGHT_IT_TOKEN", "it-token");
    let server = MockServer::start();
    let version = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/system/version")
            .header("authorization", "Bearer it-token");
        then.status(200).json_body(json!({"version": "1.3.1"}));
    });
    let tables = server.mock(|when, then| {
        when.method(GET).path("/api/v1/tables");
        then.status(200).json_body(json!({
            "data": [
                {"name": "orders", "description": "Orders", "tags": [{"tagFQN": "Tier.Tier2"}]},
                {"name": "items", "owner": {"type": "team", "name": "Ops"}}
            ],
            "paging": {"total": 2}
        }));
    });
    let posts = server.mock(|when, then| {
        when.method(POST).path("/api/v1/analytics/dataInsights/data");
        then.status(201);
    });

    let dir = tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        &server.url("/api"),
        "  type: metadata-rest\n  config: {}",
    );

    let mapping = load_config_file(&config_path).unwrap();
    let mut workflow = DataInsightWorkflowFactory::new().create(mapping).unwrap();
    workflow.execute().unwrap();
    workflow.stop();

    version.assert();
    tables.assert();
    posts.assert_hits(2);
    assert_eq!(workflow.result_status(), WorkflowResult::Success);
    assert!(workflow.raise_from_status(false).is_ok());
}

#[test]
fn failed_listing_is_reported_not_raised() {
    std::env::set_var("INSIGHT_IT_TOKEN", "it-token");
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/system/version");
        then.status(200).json_body(json!({"version": "1.3.1"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/tables");
        then.status(503);
    });

    let dir = tempdir().unwrap();
    let out = dir.path().join("report.jsonl");
    let config_path = write_config(
        dir.path(),
        &server.url("/api"),
        &format!("  type: file\n  config:\n    path: {}", out.display()),
    );

    let mapping = load_config_file(&config_path).unwrap();
    let mut workflow = DataInsightWorkflowFactory::new().create(mapping).unwrap();
    workflow.execute().unwrap();
    workflow.stop();

    assert_eq!(workflow.result_status(), WorkflowResult::Failure);
    assert!(workflow.raise_from_status(false).is_err());
    assert_eq!(fs::read_to_string(&out).unwrap(), "");
}
