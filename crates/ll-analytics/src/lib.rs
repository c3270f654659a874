//! Adaptive result analytics
//!
//! Given a schema-less result set, this crate decides how to chart it and
//! how to summarize it: column role classification, renderer-agnostic chart
//! specifications, descriptive statistics, and structured report documents.

pub mod chart;
pub mod classify;
pub mod report;
pub mod stats;

pub use chart::{build_chart_spec, ChartBuild, ChartKind, ChartSpec, PaletteColor, Series};
pub use classify::{classify, select_label_column, select_value_column, ColumnProfile, ColumnRole};
pub use report::{render, to_html, to_text, Document, Metric, ReportKind, Section, TableSection};
pub use stats::{aggregate, CategoryStats, NumericStats, StatisticsReport};
