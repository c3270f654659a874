//! Result-set data model
//!
//! A query response carries rows of heterogeneous key/value pairs with no
//! declared column types. Column order is presentation order, so rows are
//! kept as insertion-ordered maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single result row: column name to untyped value.
pub type Row = IndexMap<String, Value>;

/// One complete result set. Owned transiently for the duration of one
/// display cycle and replaced wholesale on every new query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names, unique, in presentation order
    pub columns: Vec<String>,
    /// Result rows in the order the service returned them
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Wire shape returned by the remote query collaborator for both
/// natural-language and direct-query execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interpret a value as a number: native numbers pass through, strings
/// must parse fully as a float. Everything else is non-numeric.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// String form of a value for display and grouping. Strings come back
/// as-is; scalars and nested objects use their JSON rendering.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Truncate to at most `max` characters, appending an ellipsis when
/// anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
