//! Chart specification builder
//!
//! Turns a result set plus a chosen chart kind into a renderer-agnostic
//! chart specification. Nothing here knows how a chart is painted; the
//! output is plain data the rendering collaborator consumes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ll_core::result::{display_string, numeric_value, truncate, Row};

use crate::classify::{classify, is_time_named, select_label_column, select_value_column, ColumnRole};

/// Rows charted at most, uniformly across chart kinds.
const MAX_POINTS: usize = 50;

/// Distinct groups kept by the frequency-count fallback.
const MAX_FALLBACK_GROUPS: usize = 20;

/// Label and grouping-key truncation length.
const LABEL_MAX_CHARS: usize = 30;

/// Placeholder label for null values.
const NULL_LABEL: &str = "N/A";

/// Supported chart kinds. Area is a presentation variant of line
/// (line-with-fill), not a distinct series construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Doughnut,
    Line,
    Area,
}

impl ChartKind {
    /// Pie-family kinds color per slice instead of per series.
    pub fn is_sliced(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }

    /// Continuous kinds chart every numeric column as its own series.
    pub fn is_continuous(self) -> bool {
        matches!(self, ChartKind::Line | ChartKind::Area)
    }
}

/// A fill/border color pair from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    /// RGBA, ~0.7 opacity
    pub fill: [u8; 4],
    /// Same hue at full opacity
    pub border: [u8; 4],
}

const PALETTE: &[[u8; 3]] = &[
    [100, 150, 250], // Blue
    [250, 150, 100], // Orange
    [150, 250, 100], // Green
    [250, 100, 150], // Pink
    [150, 100, 250], // Purple
    [250, 250, 100], // Yellow
    [100, 250, 250], // Cyan
    [250, 100, 100], // Red
];

/// Palette color for a series or slice index, cycling past 8.
pub fn palette_color(index: usize) -> PaletteColor {
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    PaletteColor {
        fill: [r, g, b, 178],
        border: [r, g, b, 255],
    }
}

/// One value series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    /// Index into the palette cycle
    pub color_index: usize,
}

/// Renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub label_column: String,
    pub value_columns: Vec<String>,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    /// Per-slice palette indices for pie kinds, per-series otherwise
    pub palette_assignment: Vec<usize>,
}

/// Outcome of chart building. NotChartable is a user-facing informational
/// result, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartBuild {
    Chart(ChartSpec),
    NotChartable(String),
}

impl ChartBuild {
    pub fn spec(&self) -> Option<&ChartSpec> {
        match self {
            ChartBuild::Chart(spec) => Some(spec),
            ChartBuild::NotChartable(_) => None,
        }
    }
}

fn format_label(value: Option<&Value>, temporal: bool) -> String {
    let value = match value {
        None | Some(Value::Null) => return NULL_LABEL.to_string(),
        Some(v) => v,
    };
    if temporal {
        if let Value::String(s) = value {
            if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(s) {
                return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
            }
        }
    }
    truncate(&display_string(value), LABEL_MAX_CHARS)
}

fn coerce_value(value: Option<&Value>) -> f64 {
    // Unparseable values become 0 so label/value alignment is preserved.
    value.and_then(numeric_value).unwrap_or(0.0)
}

/// Build a chart spec. Deterministic: identical inputs yield a structurally
/// identical spec.
pub fn build_chart_spec(
    rows: &[Row],
    columns: &[String],
    kind: ChartKind,
    selected_value_column: Option<&str>,
) -> ChartBuild {
    if rows.is_empty() || columns.is_empty() {
        return ChartBuild::NotChartable("No results to chart.".to_string());
    }

    let Some(value_column) = select_value_column(rows, columns, selected_value_column) else {
        return frequency_fallback(rows, columns, kind);
    };

    let label_column = select_label_column(rows, columns, Some(&value_column))
        .unwrap_or_else(|| value_column.clone());
    let temporal_labels = is_time_named(&label_column);

    let charted = &rows[..rows.len().min(MAX_POINTS)];
    let labels: Vec<String> = charted
        .iter()
        .map(|row| format_label(row.get(&label_column), temporal_labels))
        .collect();

    // Continuous kinds chart every numeric-role column; categorical kinds
    // chart the single chosen value column.
    let mut value_columns = vec![value_column.clone()];
    if kind.is_continuous() {
        for profile in classify(rows, columns) {
            if profile.role == ColumnRole::Numeric
                && profile.name != value_column
                && profile.name != label_column
            {
                value_columns.push(profile.name);
            }
        }
    }

    let series: Vec<Series> = value_columns
        .iter()
        .enumerate()
        .map(|(index, column)| Series {
            name: column.clone(),
            values: charted
                .iter()
                .map(|row| coerce_value(row.get(column)))
                .collect(),
            color_index: index % PALETTE.len(),
        })
        .collect();

    let palette_assignment = if kind.is_sliced() {
        (0..labels.len()).map(|i| i % PALETTE.len()).collect()
    } else {
        series.iter().map(|s| s.color_index).collect()
    };

    ChartBuild::Chart(ChartSpec {
        kind,
        label_column,
        value_columns,
        labels,
        series,
        palette_assignment,
    })
}

/// No numeric column anywhere: chart the frequency of the label column
/// instead. Group keys keep first-occurrence order, capped at 20 distinct
/// groups; later rows still count into existing groups.
fn frequency_fallback(rows: &[Row], columns: &[String], kind: ChartKind) -> ChartBuild {
    let Some(label_column) = select_label_column(rows, columns, None) else {
        return ChartBuild::NotChartable("No results to chart.".to_string());
    };

    let mut counts: IndexMap<String, f64> = IndexMap::new();
    for row in rows {
        let key = match row.get(&label_column) {
            None | Some(Value::Null) => NULL_LABEL.to_string(),
            Some(value) => truncate(&display_string(value), LABEL_MAX_CHARS),
        };
        if let Some(count) = counts.get_mut(&key) {
            *count += 1.0;
        } else if counts.len() < MAX_FALLBACK_GROUPS {
            counts.insert(key, 1.0);
        }
    }

    if counts.is_empty() {
        return ChartBuild::NotChartable("No results to chart.".to_string());
    }

    let labels: Vec<String> = counts.keys().cloned().collect();
    let values: Vec<f64> = counts.values().copied().collect();
    let palette_assignment = if kind.is_sliced() {
        (0..labels.len()).map(|i| i % PALETTE.len()).collect()
    } else {
        vec![0]
    };

    tracing::debug!(
        column = %label_column,
        groups = labels.len(),
        "no numeric column; charting value frequencies"
    );

    ChartBuild::Chart(ChartSpec {
        kind,
        label_column: label_column.clone(),
        value_columns: Vec::new(),
        labels,
        series: vec![Series {
            name: "Count".to_string(),
            values,
            color_index: 0,
        }],
        palette_assignment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(cells: Vec<(&str, Value)>) -> Row {
        let mut row = Row::new();
        for (name, value) in cells {
            row.insert(name.to_string(), value);
        }
        row
    }

    fn level_count_rows(n: usize) -> (Vec<Row>, Vec<String>) {
        let rows = (0..n)
            .map(|i| {
                row(vec![
                    ("Level", json!(format!("level-{i}"))),
                    ("Count", json!(i as f64)),
                ])
            })
            .collect();
        (rows, vec!["Level".to_string(), "Count".to_string()])
    }

    #[test]
    fn test_labels_and_values_capped_and_aligned() {
        let (rows, columns) = level_count_rows(80);
        let build = build_chart_spec(&rows, &columns, ChartKind::Bar, None);
        let spec = build.spec().expect("chartable");

        assert_eq!(spec.labels.len(), MAX_POINTS);
        assert_eq!(spec.series[0].values.len(), spec.labels.len());
        // Truncation keeps the first rows in original order
        assert_eq!(spec.labels[0], "level-0");
        assert_eq!(spec.series[0].values[49], 49.0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let (rows, columns) = level_count_rows(12);
        let first = build_chart_spec(&rows, &columns, ChartKind::Pie, None);
        let second = build_chart_spec(&rows, &columns, ChartKind::Pie, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparseable_values_default_to_zero() {
        let rows = vec![
            row(vec![("Level", json!("a")), ("Count", json!(7))]),
            row(vec![("Level", json!("b")), ("Count", json!("oops"))]),
            row(vec![("Level", json!("c")), ("Count", json!(null))]),
        ];
        let columns = vec!["Level".to_string(), "Count".to_string()];
        let build = build_chart_spec(&rows, &columns, ChartKind::Bar, None);
        let spec = build.spec().unwrap();
        assert_eq!(spec.series[0].values, vec![7.0, 0.0, 0.0]);
        assert_eq!(spec.labels.len(), 3);
    }

    #[test]
    fn test_null_label_placeholder_and_truncation() {
        let long = "z".repeat(45);
        let rows = vec![
            row(vec![("Level", json!(null)), ("Count", json!(1))]),
            row(vec![("Level", json!(long)), ("Count", json!(2))]),
        ];
        let columns = vec!["Level".to_string(), "Count".to_string()];
        let spec = build_chart_spec(&rows, &columns, ChartKind::Bar, None)
            .spec()
            .cloned()
            .unwrap();
        assert_eq!(spec.labels[0], "N/A");
        assert_eq!(spec.labels[1].chars().count(), 31);
        assert!(spec.labels[1].ends_with('…'));
    }

    #[test]
    fn test_temporal_labels_formatted() {
        let rows = vec![row(vec![
            ("TimeGenerated", json!("2024-01-01T06:00:00Z")),
            ("CounterValue", json!(12.5)),
        ])];
        let columns = vec!["TimeGenerated".to_string(), "CounterValue".to_string()];
        let spec = build_chart_spec(&rows, &columns, ChartKind::Line, None)
            .spec()
            .cloned()
            .unwrap();
        assert_eq!(spec.labels[0], "2024-01-01 06:00:00");
    }

    #[test]
    fn test_frequency_fallback_caps_groups() {
        let rows: Vec<Row> = (0..30)
            .map(|i| row(vec![("Level", json!(format!("group-{i}")))]))
            .chain(std::iter::once(row(vec![("Level", json!("group-0"))])))
            .collect();
        let columns = vec!["Level".to_string()];
        let spec = build_chart_spec(&rows, &columns, ChartKind::Bar, None)
            .spec()
            .cloned()
            .unwrap();

        assert_eq!(spec.labels.len(), MAX_FALLBACK_GROUPS);
        // First-occurrence order, and the re-seen group keeps counting
        assert_eq!(spec.labels[0], "group-0");
        assert_eq!(spec.series[0].values[0], 2.0);
        assert_eq!(spec.series[0].name, "Count");
    }

    #[test]
    fn test_empty_input_not_chartable() {
        let build = build_chart_spec(&[], &["Level".to_string()], ChartKind::Line, None);
        assert!(matches!(build, ChartBuild::NotChartable(_)));
    }

    #[test]
    fn test_palette_cycles_past_eight() {
        assert_eq!(palette_color(0), palette_color(8));
        assert_ne!(palette_color(0), palette_color(1));
        let color = palette_color(3);
        assert_eq!(color.border[3], 255);
        assert_eq!(color.fill[3], 178);
        assert_eq!(color.fill[..3], color.border[..3]);
    }

    #[test]
    fn test_continuous_kind_charts_all_numeric_columns() {
        let rows = vec![
            row(vec![
                ("TimeGenerated", json!("2024-01-01T00:00:00Z")),
                ("AvgCPU", json!(10.0)),
                ("AvgMemory", json!(55.0)),
            ]),
            row(vec![
                ("TimeGenerated", json!("2024-01-01T00:05:00Z")),
                ("AvgCPU", json!(12.0)),
                ("AvgMemory", json!(54.0)),
            ]),
        ];
        let columns = vec![
            "TimeGenerated".to_string(),
            "AvgCPU".to_string(),
            "AvgMemory".to_string(),
        ];
        let spec = build_chart_spec(&rows, &columns, ChartKind::Line, None)
            .spec()
            .cloned()
            .unwrap();
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.palette_assignment, vec![0, 1]);

        // Bar keeps the single chosen value column
        let bar = build_chart_spec(&rows, &columns, ChartKind::Bar, None)
            .spec()
            .cloned()
            .unwrap();
        assert_eq!(bar.series.len(), 1);
    }
}
