//! Blocking REST client for the OpenMetadata server.

use super::entity::{EntityPage, EntityType, ReportData};
use crate::config::{AuthProvider, ServerConfig};
use anyhow::{Context, Result};
use insight_error::{ConstructionError, ConstructionResult};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const PAGE_LIMIT: usize = 100;
const ENTITY_FIELDS: &str = "owner,owners,tags";

/// Server operations the Data Insight steps need.
pub trait MetadataApi: Send + Sync {
    fn server_version(&self) -> Result<String>;

    fn list_entities(&self, entity: EntityType, after: Option<&str>) -> Result<EntityPage>;

    fn post_report_data(&self, record: &ReportData) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

pub struct OpenMetadataClient {
    base: String,
    token: Option<String>,
    http: Client,
}

impl OpenMetadataClient {
    pub fn new(server: &ServerConfig) -> ConstructionResult<Self> {
        let base = validate_host_port(&server.host_port)?;
        let token = match server.auth_provider {
            AuthProvider::OpenMetadata => Some(
                server
                    .jwt_token()
                    .ok_or(ConstructionError::MissingJwtToken)?
                    .to_string(),
            ),
            AuthProvider::NoAuth => None,
        };
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("insight")
            .build()
            .map_err(|e| ConstructionError::HttpClient(e.to_string()))?;
        Ok(Self { base, token, http })
    }

    /// Validated `hostPort`, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl MetadataApi for OpenMetadataClient {
    fn server_version(&self) -> Result<String> {
        let url = self.url("system/version");
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;
        let body: VersionResponse = response.json().context("invalid version response")?;
        Ok(body.version)
    }

    fn list_entities(&self, entity: EntityType, after: Option<&str>) -> Result<EntityPage> {
        let url = self.url(entity.endpoint());
        let limit = PAGE_LIMIT.to_string();
        let mut query = vec![("fields", ENTITY_FIELDS), ("limit", limit.as_str())];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }
        let response = self
            .authorize(self.http.get(&url).query(&query))
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;
        response
            .json::<EntityPage>()
            .with_context(|| format!("invalid {} listing", entity.endpoint()))
    }

    fn post_report_data(&self, record: &ReportData) -> Result<()> {
        let url = self.url("analytics/dataInsights/data");
        self.authorize(self.http.post(&url).json(record))
            .send()
            .with_context(|| format!("POST {url}"))?
            .error_for_status()?;
        Ok(())
    }
}

/// `hostPort` must be an absolute http(s) URL. The base is rebuilt from the
/// parsed URL, so surrounding whitespace and a trailing slash are dropped.
pub fn validate_host_port(host_port: &str) -> ConstructionResult<String> {
    let invalid = |reason: String| ConstructionError::InvalidHostPort {
        host_port: host_port.to_string(),
        reason,
    };
    let parsed = Url::parse(host_port).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
