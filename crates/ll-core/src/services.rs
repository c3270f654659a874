//! Traits for the external collaborators
//!
//! The engine itself is synchronous; these traits mark the asynchronous
//! edges it talks across: the remote query service, the remote assistant,
//! and the durable key-value store used for history and favorites.

use serde::{Deserialize, Serialize};

use crate::result::{QueryResponse, Row};
use crate::EngineError;

/// Remote query service. Executes queries it is handed; the engine never
/// validates or interprets the query text.
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    /// Execute a query, optionally bounded to a lookback window.
    async fn execute(
        &self,
        query: &str,
        timespan: Option<chrono::Duration>,
    ) -> Result<QueryResponse, EngineError>;

    /// List the tables available in the workspace.
    async fn available_tables(&self) -> Vec<String>;

    /// Fetch the schema of a single table.
    async fn table_schema(&self, table: &str) -> Result<QueryResponse, EngineError>;
}

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the assistant conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Result context forwarded with an assistant request. The sample is a
/// capped slice of the current result set, never the full set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_query: Option<String>,
    #[serde(default)]
    pub results_sample: Vec<Row>,
    #[serde(default)]
    pub result_count: usize,
}

/// Wire shape sent to the remote assistant collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub message: String,
    pub context: AssistantContext,
    pub history_slice: Vec<ChatTurn>,
}

/// Wire shape returned by the remote assistant collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_queries: Vec<String>,
}

/// Remote assistant service.
#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    async fn send(&self, request: &AssistantRequest) -> Result<AssistantReply, EngineError>;
}

/// Durable key-value collaborator. Persistence failures are the
/// implementation's concern to log; callers treat writes as fire-and-forget
/// and tolerate absent or malformed reads.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}
