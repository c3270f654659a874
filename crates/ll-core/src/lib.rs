//! Core functionality for the log analytics engine
//!
//! This crate provides the result-set data model, the traits for the
//! external collaborators (query service, assistant service, durable
//! key-value store), session state, and flat-format export.

pub mod export;
pub mod result;
pub mod services;
pub mod state;

use thiserror::Error;

// Re-export commonly used types
pub use result::{display_string, numeric_value, truncate, QueryResponse, ResultSet, Row};
pub use services::{
    AssistantContext, AssistantReply, AssistantRequest, AssistantService, ChatRole, ChatTurn,
    KeyValueStore, QueryService,
};
pub use state::{ActiveView, ChartSurface, SessionState};

/// Errors that can occur in engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// A collaborator (query service or assistant) reported a failure.
    /// The message is passed through verbatim; prior state is untouched.
    #[error("{0}")]
    Upstream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<csv::Error> for EngineError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                EngineError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => EngineError::Csv(error.to_string()),
        }
    }
}
