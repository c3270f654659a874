//! HTTP implementations of the collaborator traits
//!
//! `HttpQueryService` talks to the Log Analytics REST endpoint and maps its
//! table/columns/rows response into the engine's row model.
//! `HttpAssistantService` forwards assistant requests to a configured
//! endpoint. Transport and service failures surface as
//! `EngineError::Upstream` with the message passed through verbatim.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use ll_core::{
    AssistantReply, AssistantRequest, AssistantService, EngineError, QueryResponse, QueryService,
    Row,
};

use crate::config::Config;

const QUERY_BASE: &str = "https://api.loganalytics.io/v1/workspaces";
const TOKEN_SCOPE: &str = "https://api.loganalytics.io/.default";

/// Tables offered when the workspace cannot be enumerated.
const COMMON_TABLES: &[&str] = &[
    "AzureActivity",
    "AzureDiagnostics",
    "AzureMetrics",
    "Heartbeat",
    "Perf",
    "Event",
    "Syslog",
    "SecurityEvent",
    "AppTraces",
    "AppRequests",
    "AppExceptions",
    "ContainerLog",
    "KubeEvents",
];

#[derive(Deserialize)]
struct WireColumn {
    name: String,
}

#[derive(Deserialize)]
struct WireTable {
    columns: Vec<WireColumn>,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    tables: Vec<WireTable>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Map the service's positional rows onto named rows in column order.
fn map_response(wire: WireResponse) -> QueryResponse {
    let Some(table) = wire.tables.into_iter().next() else {
        return QueryResponse::default();
    };
    let columns: Vec<String> = table.columns.into_iter().map(|c| c.name).collect();
    let rows: Vec<Row> = table
        .rows
        .into_iter()
        .map(|cells| columns.iter().cloned().zip(cells).collect())
        .collect();
    let row_count = rows.len();
    QueryResponse {
        columns,
        results: rows,
        row_count,
        translated_query: None,
        error: None,
    }
}

/// Render a lookback window in the ISO-8601 duration form the service
/// expects.
fn iso_duration(timespan: Duration) -> String {
    format!("PT{}S", timespan.num_seconds().max(0))
}

/// Query client against the workspace REST endpoint.
pub struct HttpQueryService {
    http: reqwest::Client,
    workspace_id: String,
    config: Config,
    token: RwLock<Option<CachedToken>>,
}

impl HttpQueryService {
    pub fn new(config: Config, workspace_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            workspace_id,
            config,
            token: RwLock::new(None),
        }
    }

    async fn bearer_token(&self) -> Result<String, EngineError> {
        if let Some(cached) = self.token.read().as_ref() {
            if cached.expires_at > Utc::now() {
                return Ok(cached.value.clone());
            }
        }
        if self.config.has_service_principal() {
            let token = self.fetch_token().await?;
            return Ok(token);
        }
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }
        Err(EngineError::Upstream(
            "no credentials configured: set AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET or AZURE_ACCESS_TOKEN".to_string(),
        ))
    }

    async fn fetch_token(&self) -> Result<String, EngineError> {
        // has_service_principal() was checked by the caller
        let tenant = self.config.tenant_id.as_deref().unwrap_or_default();
        let url = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_deref().unwrap_or_default()),
            ("client_secret", self.config.client_secret.as_deref().unwrap_or_default()),
            ("scope", TOKEN_SCOPE),
        ];
        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream(format!(
                "token request failed: {status}: {body}"
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))?;
        // Refresh a minute early
        let expires_at = Utc::now() + Duration::seconds((token.expires_in - 60).max(0));
        *self.token.write() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}

#[async_trait::async_trait]
impl QueryService for HttpQueryService {
    async fn execute(
        &self,
        query: &str,
        timespan: Option<Duration>,
    ) -> Result<QueryResponse, EngineError> {
        let token = self.bearer_token().await?;
        let url = format!("{QUERY_BASE}/{}/query", self.workspace_id);

        let mut body = serde_json::json!({ "query": query });
        if let Some(window) = timespan {
            body["timespan"] = Value::String(iso_duration(window));
        }

        tracing::debug!(%url, query, "executing query");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream(format!("{status}: {body}")));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))?;
        Ok(map_response(wire))
    }

    async fn available_tables(&self) -> Vec<String> {
        let query = "search * | distinct $table | order by $table asc";
        match self.execute(query, Some(Duration::days(1))).await {
            Ok(response) => {
                let tables: Vec<String> = response
                    .results
                    .iter()
                    .filter_map(|row| row.get("$table"))
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect();
                if tables.is_empty() {
                    COMMON_TABLES.iter().map(|t| t.to_string()).collect()
                } else {
                    tables
                }
            }
            Err(error) => {
                tracing::warn!(%error, "table enumeration failed, using common tables");
                COMMON_TABLES.iter().map(|t| t.to_string()).collect()
            }
        }
    }

    async fn table_schema(&self, table: &str) -> Result<QueryResponse, EngineError> {
        let query = format!("{table} | getschema");
        self.execute(&query, Some(Duration::hours(1))).await
    }
}

/// Assistant client posting to the configured endpoint.
pub struct HttpAssistantService {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    deployment: Option<String>,
}

impl HttpAssistantService {
    pub fn new(endpoint: String, key: String, deployment: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            key,
            deployment,
        }
    }
}

#[async_trait::async_trait]
impl AssistantService for HttpAssistantService {
    async fn send(&self, request: &AssistantRequest) -> Result<AssistantReply, EngineError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("api-key", &self.key)
            .json(request);
        if let Some(deployment) = &self.deployment {
            builder = builder.query(&[("deployment", deployment)]);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream(format!("{status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| EngineError::Upstream(e.to_string()))
    }
}
