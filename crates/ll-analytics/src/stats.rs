//! Statistics aggregation
//!
//! Descriptive summaries of a result set: numeric min/max/mean/sum per
//! fully-numeric column and frequency breakdowns per low-cardinality
//! categorical column. Unlike the classifier's sampling, a column counts as
//! numeric here only if every retained value parses — full set, no shortcut.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use ll_core::result::{display_string, numeric_value, truncate, Row};

/// Numeric columns reported at most, in first-found order.
const MAX_NUMERIC_COLUMNS: usize = 5;

/// Categorical columns reported at most, in first-found order.
const MAX_CATEGORY_COLUMNS: usize = 3;

/// A categorical column qualifies only with more than one and at most this
/// many distinct values.
const MAX_DISTINCT_VALUES: usize = 20;

/// Frequency keys are the string form truncated to this many characters.
const VALUE_KEY_MAX_CHARS: usize = 50;

/// Summary of one fully-numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub sum: f64,
}

/// One value of a categorical breakdown. Raw count only; percentage
/// rounding is the report renderer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub value: String,
    pub count: usize,
}

/// Frequency breakdown of one categorical column, sorted by count
/// descending with ties in first-encountered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub column: String,
    pub values: Vec<CategoryValue>,
}

/// Aggregated descriptive summary of a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub record_count: usize,
    pub column_count: usize,
    pub numeric: Vec<NumericStats>,
    pub categories: Vec<CategoryStats>,
}

/// Aggregate the full result set.
pub fn aggregate(rows: &[Row], columns: &[String]) -> StatisticsReport {
    let mut numeric = Vec::new();
    let mut categories = Vec::new();

    for column in columns {
        let retained: Vec<_> = rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_null())
            .collect();
        if retained.is_empty() {
            continue;
        }

        let parsed: Vec<f64> = retained
            .iter()
            .filter_map(|value| numeric_value(value))
            .collect();

        if parsed.len() == retained.len() {
            if numeric.len() < MAX_NUMERIC_COLUMNS {
                let sum: f64 = parsed.iter().sum();
                let min = parsed.iter().copied().fold(f64::INFINITY, f64::min);
                let max = parsed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                numeric.push(NumericStats {
                    column: column.clone(),
                    min,
                    max,
                    avg: sum / parsed.len() as f64,
                    sum,
                });
            }
            continue;
        }

        if categories.len() >= MAX_CATEGORY_COLUMNS {
            continue;
        }

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for value in &retained {
            let key = truncate(&display_string(value), VALUE_KEY_MAX_CHARS);
            *counts.entry(key).or_insert(0) += 1;
        }

        // A constant column is uninformative; a high-cardinality one cannot
        // be summarized meaningfully.
        if counts.len() <= 1 || counts.len() > MAX_DISTINCT_VALUES {
            continue;
        }

        let mut values: Vec<CategoryValue> = counts
            .into_iter()
            .map(|(value, count)| CategoryValue { value, count })
            .collect();
        values.sort_by(|a, b| b.count.cmp(&a.count));
        categories.push(CategoryStats {
            column: column.clone(),
            values,
        });
    }

    StatisticsReport {
        record_count: rows.len(),
        column_count: columns.len(),
        numeric,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(cells: Vec<(&str, Value)>) -> Row {
        let mut row = Row::new();
        for (name, value) in cells {
            row.insert(name.to_string(), value);
        }
        row
    }

    #[test]
    fn test_level_count_example() {
        let rows = vec![
            row(vec![("Level", json!("Error")), ("Count", json!(5))]),
            row(vec![("Level", json!("Warning")), ("Count", json!(2))]),
            row(vec![("Level", json!("Error")), ("Count", json!(1))]),
        ];
        let report = aggregate(&rows, &["Level".to_string(), "Count".to_string()]);

        assert_eq!(report.record_count, 3);
        assert_eq!(report.column_count, 2);

        assert_eq!(report.numeric.len(), 1);
        let count = &report.numeric[0];
        assert_eq!(count.column, "Count");
        assert_eq!(count.min, 1.0);
        assert_eq!(count.max, 5.0);
        assert_eq!(count.sum, 8.0);
        assert!((count.avg - 8.0 / 3.0).abs() < 1e-9);

        assert_eq!(report.categories.len(), 1);
        let level = &report.categories[0];
        assert_eq!(level.column, "Level");
        assert_eq!(level.values[0], CategoryValue { value: "Error".into(), count: 2 });
        assert_eq!(level.values[1], CategoryValue { value: "Warning".into(), count: 1 });
    }

    #[test]
    fn test_numeric_invariants() {
        let rows = vec![
            row(vec![("DurationMs", json!("120.5"))]),
            row(vec![("DurationMs", json!(88))]),
            row(vec![("DurationMs", json!(null))]),
            row(vec![("DurationMs", json!("200"))]),
        ];
        let report = aggregate(&rows, &["DurationMs".to_string()]);
        let stats = &report.numeric[0];

        assert!(stats.min <= stats.avg && stats.avg <= stats.max);
        // Nulls are dropped before parsing, so three retained values
        assert!((stats.sum - stats.avg * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_non_numeric_value_makes_column_categorical() {
        let rows = vec![
            row(vec![("ResultCode", json!("200"))]),
            row(vec![("ResultCode", json!("404"))]),
            row(vec![("ResultCode", json!("timeout"))]),
        ];
        let report = aggregate(&rows, &["ResultCode".to_string()]);
        assert!(report.numeric.is_empty());
        assert_eq!(report.categories.len(), 1);
    }

    fn distinct_rows(column: &str, distinct: usize) -> Vec<Row> {
        (0..distinct)
            .map(|i| row(vec![(column, json!(format!("v{i} suffix")))]))
            .collect()
    }

    #[test]
    fn test_distinct_count_inclusion_boundaries() {
        let constant = vec![
            row(vec![("Level", json!("Error"))]),
            row(vec![("Level", json!("Error"))]),
        ];
        assert!(aggregate(&constant, &["Level".to_string()]).categories.is_empty());

        let at_limit = distinct_rows("Level", 20);
        assert_eq!(aggregate(&at_limit, &["Level".to_string()]).categories.len(), 1);

        let over_limit = distinct_rows("Level", 21);
        assert!(aggregate(&over_limit, &["Level".to_string()]).categories.is_empty());
    }

    #[test]
    fn test_frequency_keys_truncated() {
        let long_a = format!("{}-a", "x".repeat(60));
        let long_b = format!("{}-b", "x".repeat(60));
        let rows = vec![
            row(vec![("Message", json!(long_a))]),
            row(vec![("Message", json!(long_b))]),
            row(vec![("Message", json!("short"))]),
        ];
        let report = aggregate(&rows, &["Message".to_string()]);
        // Both long values collapse to the same 50-char key
        let breakdown = &report.categories[0];
        assert_eq!(breakdown.values.len(), 2);
        assert_eq!(breakdown.values[0].count, 2);
        assert!(breakdown.values[0].value.chars().count() <= 51);
    }

    #[test]
    fn test_column_caps_first_found_order() {
        let mut cells_a = Vec::new();
        let mut cells_b = Vec::new();
        let mut columns = Vec::new();
        for i in 0..7 {
            let name = format!("Metric{i}");
            columns.push(name);
        }
        for name in &columns {
            cells_a.push((name.as_str(), json!(1)));
            cells_b.push((name.as_str(), json!(2)));
        }
        let rows = vec![row(cells_a), row(cells_b)];
        let report = aggregate(&rows, &columns);

        assert_eq!(report.numeric.len(), 5);
        assert_eq!(report.numeric[0].column, "Metric0");
        assert_eq!(report.numeric[4].column, "Metric4");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let rows = vec![
            row(vec![("Level", json!("Warning"))]),
            row(vec![("Level", json!("Error"))]),
            row(vec![("Level", json!("Error"))]),
            row(vec![("Level", json!("Info"))]),
        ];
        let report = aggregate(&rows, &["Level".to_string()]);
        let values = &report.categories[0].values;
        assert_eq!(values[0].value, "Error");
        // Warning and Info tie at 1 and keep first-encountered order
        assert_eq!(values[1].value, "Warning");
        assert_eq!(values[2].value, "Info");
    }
}
