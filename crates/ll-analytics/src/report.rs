//! Report rendering
//!
//! Formats a statistics report into a structured document tree. The
//! on-screen summary, the statistics panel, and the printable export all
//! share one section model; serializers turn the tree into plain text or
//! markup without ever reaching back into the statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ll_core::result::{display_string, truncate, ResultSet};

use crate::stats::StatisticsReport;

/// Rows embedded in the printable data preview.
const PREVIEW_ROWS: usize = 20;

/// Preview and distribution cells are truncated to this many characters.
const CELL_MAX_CHARS: usize = 50;

/// Which report variant to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Summary,
    Statistics,
    Printable,
}

impl ReportKind {
    fn title(self) -> &'static str {
        match self {
            ReportKind::Summary => "Results Summary",
            ReportKind::Statistics => "Statistics",
            ReportKind::Printable => "Query Results Report",
        }
    }
}

/// One header metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// A titled table with a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Document sections in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Metrics(Vec<Metric>),
    Table(TableSection),
}

/// A rendered report document, ready for a swappable serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub kind: ReportKind,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
}

fn preview_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => truncate(&display_string(value), CELL_MAX_CHARS),
    }
}

/// Render a report document. Pure: the statistics report is never mutated
/// and identical inputs produce an identical document. The printable kind
/// additionally embeds a capped data preview.
pub fn render(
    report: &StatisticsReport,
    kind: ReportKind,
    generated_at: DateTime<Utc>,
    preview: Option<&ResultSet>,
) -> Document {
    let mut sections = Vec::new();

    sections.push(Section::Metrics(vec![
        Metric {
            label: "Records".to_string(),
            value: report.record_count.to_string(),
        },
        Metric {
            label: "Columns".to_string(),
            value: report.column_count.to_string(),
        },
        Metric {
            label: "Generated".to_string(),
            value: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        },
    ]));

    if !report.numeric.is_empty() {
        sections.push(Section::Table(TableSection {
            title: "Numeric Analysis".to_string(),
            headers: ["Column", "Min", "Max", "Avg", "Sum"]
                .map(String::from)
                .to_vec(),
            rows: report
                .numeric
                .iter()
                .map(|stats| {
                    vec![
                        stats.column.clone(),
                        format!("{:.2}", stats.min),
                        format!("{:.2}", stats.max),
                        format!("{:.2}", stats.avg),
                        format!("{:.2}", stats.sum),
                    ]
                })
                .collect(),
        }));
    }

    for category in &report.categories {
        let total = report.record_count.max(1) as f64;
        sections.push(Section::Table(TableSection {
            title: format!("Distribution: {}", category.column),
            headers: ["Value", "Count", "Percent"].map(String::from).to_vec(),
            rows: category
                .values
                .iter()
                .map(|entry| {
                    vec![
                        entry.value.clone(),
                        entry.count.to_string(),
                        format!("{:.1}%", entry.count as f64 / total * 100.0),
                    ]
                })
                .collect(),
        }));
    }

    if kind == ReportKind::Printable {
        if let Some(results) = preview {
            sections.push(Section::Table(TableSection {
                title: format!("Data Preview (first {PREVIEW_ROWS} rows)"),
                headers: results.columns.clone(),
                rows: results
                    .rows
                    .iter()
                    .take(PREVIEW_ROWS)
                    .map(|row| {
                        results
                            .columns
                            .iter()
                            .map(|column| preview_cell(row.get(column)))
                            .collect()
                    })
                    .collect(),
            }));
        }
    }

    Document {
        kind,
        title: kind.title().to_string(),
        generated_at,
        sections,
    }
}

/// Serialize a document to plain text with aligned table columns.
pub fn to_text(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(&document.title);
    out.push('\n');
    out.push_str(&"=".repeat(document.title.chars().count()));
    out.push('\n');

    for section in &document.sections {
        match section {
            Section::Metrics(metrics) => {
                for metric in metrics {
                    out.push_str(&format!("{}: {}\n", metric.label, metric.value));
                }
            }
            Section::Table(table) => {
                out.push('\n');
                out.push_str(&table.title);
                out.push('\n');

                let mut widths: Vec<usize> =
                    table.headers.iter().map(|h| h.chars().count()).collect();
                for row in &table.rows {
                    for (i, cell) in row.iter().enumerate() {
                        if i < widths.len() {
                            widths[i] = widths[i].max(cell.chars().count());
                        }
                    }
                }

                let format_row = |cells: &[String]| -> String {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                        .collect::<Vec<_>>()
                        .join("  ")
                        .trim_end()
                        .to_string()
                };

                out.push_str(&format_row(&table.headers));
                out.push('\n');
                out.push_str(
                    &"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)),
                );
                out.push('\n');
                for row in &table.rows {
                    out.push_str(&format_row(row));
                    out.push('\n');
                }
            }
        }
    }

    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize a document to minimal HTML markup for the printable export.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&document.title)));

    for section in &document.sections {
        match section {
            Section::Metrics(metrics) => {
                out.push_str("<ul>\n");
                for metric in metrics {
                    out.push_str(&format!(
                        "<li><strong>{}</strong>: {}</li>\n",
                        escape_html(&metric.label),
                        escape_html(&metric.value)
                    ));
                }
                out.push_str("</ul>\n");
            }
            Section::Table(table) => {
                out.push_str(&format!("<h2>{}</h2>\n<table>\n<tr>", escape_html(&table.title)));
                for header in &table.headers {
                    out.push_str(&format!("<th>{}</th>", escape_html(header)));
                }
                out.push_str("</tr>\n");
                for row in &table.rows {
                    out.push_str("<tr>");
                    for cell in row {
                        out.push_str(&format!("<td>{}</td>", escape_html(cell)));
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</table>\n");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use chrono::TimeZone;
    use ll_core::result::Row;
    use serde_json::{json, Value};

    fn row(cells: Vec<(&str, Value)>) -> Row {
        let mut row = Row::new();
        for (name, value) in cells {
            row.insert(name.to_string(), value);
        }
        row
    }

    fn sample() -> (StatisticsReport, ResultSet) {
        let rows = vec![
            row(vec![("Level", json!("Error")), ("Count", json!(5))]),
            row(vec![("Level", json!("Warning")), ("Count", json!(2))]),
            row(vec![("Level", json!("Error")), ("Count", json!(1))]),
        ];
        let columns = vec!["Level".to_string(), "Count".to_string()];
        let report = aggregate(&rows, &columns);
        (report, ResultSet::new(columns, rows))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_render_is_reproducible() {
        let (report, results) = sample();
        let first = render(&report, ReportKind::Printable, fixed_now(), Some(&results));
        let second = render(&report, ReportKind::Printable, fixed_now(), Some(&results));
        assert_eq!(first, second);
        assert_eq!(to_text(&first), to_text(&second));
        assert_eq!(to_html(&first), to_html(&second));
    }

    #[test]
    fn test_summary_and_statistics_share_sections() {
        let (report, _) = sample();
        let summary = render(&report, ReportKind::Summary, fixed_now(), None);
        let statistics = render(&report, ReportKind::Statistics, fixed_now(), None);
        assert_eq!(summary.sections, statistics.sections);
        // Metrics, numeric analysis, one distribution
        assert_eq!(summary.sections.len(), 3);
    }

    #[test]
    fn test_percent_rounding_is_render_time() {
        let (report, _) = sample();
        let document = render(&report, ReportKind::Summary, fixed_now(), None);
        let Section::Table(distribution) = &document.sections[2] else {
            panic!("expected distribution table");
        };
        assert_eq!(distribution.rows[0], vec!["Error", "2", "66.7%"]);
        assert_eq!(distribution.rows[1], vec!["Warning", "1", "33.3%"]);
    }

    #[test]
    fn test_printable_preview_capped() {
        let rows: Vec<Row> = (0..30)
            .map(|i| {
                row(vec![
                    ("Level", json!("Info")),
                    ("Message", json!("m".repeat(80))),
                    ("Count", json!(i)),
                ])
            })
            .collect();
        let columns = vec!["Level".to_string(), "Message".to_string(), "Count".to_string()];
        let report = aggregate(&rows, &columns);
        let results = ResultSet::new(columns, rows);

        let document = render(&report, ReportKind::Printable, fixed_now(), Some(&results));
        let Some(Section::Table(preview)) = document.sections.last() else {
            panic!("expected preview table");
        };
        assert_eq!(preview.rows.len(), 20);
        assert_eq!(preview.headers.len(), 3);
        assert!(preview.rows[0][1].chars().count() <= 51);
        assert!(preview.rows[0][1].ends_with('…'));
    }

    #[test]
    fn test_text_serialization_layout() {
        let (report, _) = sample();
        let text = to_text(&render(&report, ReportKind::Summary, fixed_now(), None));
        assert!(text.starts_with("Results Summary\n==============="));
        assert!(text.contains("Records: 3"));
        assert!(text.contains("Numeric Analysis"));
        assert!(text.contains("Distribution: Level"));
    }

    #[test]
    fn test_html_escapes_cells() {
        let rows = vec![
            row(vec![("Message", json!("<script>"))]),
            row(vec![("Message", json!("safe"))]),
        ];
        let columns = vec!["Message".to_string()];
        let report = aggregate(&rows, &columns);
        let results = ResultSet::new(columns, rows);
        let html = to_html(&render(&report, ReportKind::Printable, fixed_now(), Some(&results)));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
