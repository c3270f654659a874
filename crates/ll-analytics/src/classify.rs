//! Column role classification
//!
//! Inspects a result set with no declared column types and assigns each
//! column a role. Role estimation samples only the first rows of each
//! column; exact full-set numeric checks belong to the statistics
//! aggregator, which trades the sampling shortcut for precision.

use serde_json::Value;

use ll_core::result::{numeric_value, Row};

/// Rows sampled per column when estimating a role.
const SAMPLE_ROWS: usize = 10;

/// Strings longer than this are no longer treated as categorical labels.
const SHORT_STRING_MAX: usize = 50;

/// Column-name keywords that mark a likely value (measure) column, in
/// priority order.
const VALUE_KEYWORDS: &[&str] = &[
    "count",
    "sum",
    "avg",
    "min",
    "max",
    "value",
    "total",
    "duration",
    "size",
    "countervalue",
    "resultcount",
];

/// Column-name keywords that mark a likely label (dimension) column, in
/// priority order.
const LABEL_KEYWORDS: &[&str] = &[
    "name", "type", "category", "computer", "resource", "level", "status",
];

/// Name tokens that mark a temporal column. Detection is name-based only;
/// values are never date-parsed for classification.
const TIME_TOKENS: &[&str] = &["time", "date", "timestamp", "generated"];

/// Inferred semantic category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Temporal,
    Unknown,
}

/// Role and confidence derived for one column. Computed fresh per result
/// set and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub role: ColumnRole,
    /// Non-null values actually inspected
    pub sample_size: usize,
    /// Fraction of inspected values parseable as a number
    pub numeric_coverage: f64,
}

/// True when the column name contains a time/date token.
pub fn is_time_named(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIME_TOKENS.iter().any(|token| lower.contains(token))
}

fn sampled_values<'a>(rows: &'a [Row], column: &'a str) -> impl Iterator<Item = &'a Value> {
    rows.iter()
        .take(SAMPLE_ROWS)
        .filter_map(move |row| row.get(column))
        .filter(|value| !value.is_null())
}

/// Classify every column of the result set.
pub fn classify(rows: &[Row], columns: &[String]) -> Vec<ColumnProfile> {
    columns
        .iter()
        .map(|column| {
            let mut sample_size = 0usize;
            let mut numeric = 0usize;
            let mut all_short_strings = true;

            for value in sampled_values(rows, column) {
                sample_size += 1;
                if numeric_value(value).is_some() {
                    numeric += 1;
                }
                match value {
                    Value::String(s) if s.chars().count() <= SHORT_STRING_MAX => {}
                    _ => all_short_strings = false,
                }
            }

            let numeric_coverage = if sample_size == 0 {
                0.0
            } else {
                numeric as f64 / sample_size as f64
            };

            let role = if sample_size > 0 && numeric == sample_size {
                ColumnRole::Numeric
            } else if is_time_named(column) {
                ColumnRole::Temporal
            } else if sample_size > 0 && all_short_strings {
                ColumnRole::Categorical
            } else {
                ColumnRole::Unknown
            };

            ColumnProfile {
                name: column.clone(),
                role,
                sample_size,
                numeric_coverage,
            }
        })
        .collect()
}

fn sample_has_numeric(rows: &[Row], column: &str) -> bool {
    sampled_values(rows, column).any(|value| numeric_value(value).is_some())
}

/// Pick the value column used for charting.
///
/// A caller-preferred column is honored only when its sample contains at
/// least one numeric-parseable value; otherwise the keyword priority list
/// is checked, then the first column whose first value is numeric. `None`
/// means the data is not chartable as a value series.
pub fn select_value_column(
    rows: &[Row],
    columns: &[String],
    preferred: Option<&str>,
) -> Option<String> {
    if let Some(name) = preferred {
        if columns.iter().any(|c| c == name) && sample_has_numeric(rows, name) {
            return Some(name.to_string());
        }
        tracing::debug!(column = name, "preferred value column has no numeric sample");
    }

    for keyword in VALUE_KEYWORDS {
        if let Some(column) = columns.iter().find(|column| {
            column.to_lowercase().contains(keyword) && sample_has_numeric(rows, column)
        }) {
            return Some(column.clone());
        }
    }

    columns
        .iter()
        .find(|column| {
            rows.first()
                .and_then(|row| row.get(column.as_str()))
                .and_then(numeric_value)
                .is_some()
        })
        .cloned()
}

/// Pick the label column used for chart axes and grouping.
///
/// Keyword matches win; time-named columns are excluded from candidacy
/// until nothing else is left, then any time-named column, then the first
/// column overall.
pub fn select_label_column(
    rows: &[Row],
    columns: &[String],
    exclude: Option<&str>,
) -> Option<String> {
    let candidates: Vec<&String> = columns
        .iter()
        .filter(|column| Some(column.as_str()) != exclude)
        .collect();

    for keyword in LABEL_KEYWORDS {
        if let Some(column) = candidates
            .iter()
            .find(|column| column.to_lowercase().contains(keyword) && !is_time_named(column))
        {
            return Some((*column).clone());
        }
    }

    if let Some(column) = candidates.iter().find(|column| {
        !is_time_named(column)
            && rows
                .first()
                .and_then(|row| row.get(column.as_str()))
                .map(|value| value.is_string())
                .unwrap_or(false)
    }) {
        return Some((*column).clone());
    }

    if let Some(column) = candidates.iter().find(|column| is_time_named(column)) {
        return Some((*column).clone());
    }

    columns.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn rows(values: Vec<Vec<(&str, Value)>>) -> Vec<Row> {
        values
            .into_iter()
            .map(|cells| {
                let mut row = IndexMap::new();
                for (name, value) in cells {
                    row.insert(name.to_string(), value);
                }
                row
            })
            .collect()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_roles() {
        let rows = rows(vec![
            vec![
                ("TimeGenerated", json!("2024-01-01T00:00:00Z")),
                ("Level", json!("Error")),
                ("Count", json!(5)),
                ("DurationMs", json!("120.5")),
                ("Payload", json!({"nested": true})),
            ],
            vec![
                ("TimeGenerated", json!("2024-01-01T00:01:00Z")),
                ("Level", json!("Warning")),
                ("Count", json!(2)),
                ("DurationMs", json!("88")),
                ("Payload", json!({"nested": false})),
            ],
        ]);
        let profiles = classify(
            &rows,
            &columns(&["TimeGenerated", "Level", "Count", "DurationMs", "Payload"]),
        );

        assert_eq!(profiles[0].role, ColumnRole::Temporal);
        assert_eq!(profiles[1].role, ColumnRole::Categorical);
        assert_eq!(profiles[2].role, ColumnRole::Numeric);
        // Numeric strings count as numeric
        assert_eq!(profiles[3].role, ColumnRole::Numeric);
        assert_eq!(profiles[4].role, ColumnRole::Unknown);
        assert!((profiles[2].numeric_coverage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_column_is_unknown() {
        let rows = rows(vec![vec![("Message", json!(null))]]);
        let profiles = classify(&rows, &columns(&["Message"]));
        assert_eq!(profiles[0].role, ColumnRole::Unknown);
        assert_eq!(profiles[0].sample_size, 0);
    }

    #[test]
    fn test_value_column_keyword_priority() {
        let rows = rows(vec![vec![
            ("Computer", json!("web-01")),
            ("FreeBytes", json!(1024)),
            ("ResultCount", json!(3)),
        ]]);
        let selected =
            select_value_column(&rows, &columns(&["Computer", "FreeBytes", "ResultCount"]), None);
        // "ResultCount" matches the "count" keyword before the positional fallback
        assert_eq!(selected.as_deref(), Some("ResultCount"));
    }

    #[test]
    fn test_value_column_first_numeric_fallback() {
        let rows = rows(vec![vec![
            ("Message", json!("boot")),
            ("Threads", json!(12)),
        ]]);
        let selected = select_value_column(&rows, &columns(&["Message", "Threads"]), None);
        assert_eq!(selected.as_deref(), Some("Threads"));
    }

    #[test]
    fn test_preferred_column_rejected_without_numeric_sample() {
        let rows = rows(vec![vec![
            ("Status", json!("Failed")),
            ("Count", json!(4)),
        ]]);
        let selected =
            select_value_column(&rows, &columns(&["Status", "Count"]), Some("Status"));
        assert_eq!(selected.as_deref(), Some("Count"));
    }

    #[test]
    fn test_no_numeric_column_yields_none() {
        let rows = rows(vec![vec![
            ("Level", json!("Error")),
            ("Message", json!("disk full")),
        ]]);
        assert_eq!(
            select_value_column(&rows, &columns(&["Level", "Message"]), None),
            None
        );
    }

    #[test]
    fn test_label_column_excludes_time_names() {
        let rows = rows(vec![vec![
            ("TimeGenerated", json!("2024-01-01T00:00:00Z")),
            ("Computer", json!("web-01")),
            ("Count", json!(1)),
        ]]);
        let selected = select_label_column(
            &rows,
            &columns(&["TimeGenerated", "Computer", "Count"]),
            Some("Count"),
        );
        assert_eq!(selected.as_deref(), Some("Computer"));
    }

    #[test]
    fn test_label_column_time_fallback() {
        let rows = rows(vec![vec![
            ("TimeGenerated", json!("2024-01-01T00:00:00Z")),
            ("CounterValue", json!(42.0)),
        ]]);
        let selected = select_label_column(
            &rows,
            &columns(&["TimeGenerated", "CounterValue"]),
            Some("CounterValue"),
        );
        assert_eq!(selected.as_deref(), Some("TimeGenerated"));
    }
}
