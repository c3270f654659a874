//! Interactive query loop
//!
//! Accepts natural-language questions, raw KQL (prefixed `kql:`), and a
//! small command vocabulary for tables, exports, history, favorites, time
//! ranges, statistics, charts, and the assistant conversation.

use std::fs::File;
use std::io::{BufRead, Write as _};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use ll_analytics::{
    aggregate, build_chart_spec, render, to_text, ChartBuild, ChartKind, ChartSpec, ReportKind,
};
use ll_chat::{assistant_request, Transcript};
use ll_core::{
    display_string, truncate, ActiveView, AssistantService, ChartSurface, EngineError,
    KeyValueStore, QueryService, ResultSet, SessionState,
};
use ll_query::{translate, TimeRangeSelection};
use ll_store::QueryStore;

const WELCOME: &str = "\
LogLens - Log Analytics Analyzer

Ask questions in natural language, run KQL directly with `kql:`,
or type `help` for the command list.";

const HELP: &str = "\
Commands:
  help                     show this help
  tables                   list available tables
  describe <table>         show a table's schema
  kql: <query>             execute raw KQL
  samples                  list suggested queries and named KQL samples
  sample <name>            run a named KQL sample
  time <1h|6h|24h|7d|30d|all>   set the time range for questions
  time custom <start> <end>     set an explicit range (RFC 3339)
  stats                    statistics for the current results
  chart <bar|pie|doughnut|line|area> [value column]
  report                   printable report for the current results
  export csv <file>        export current results to CSV
  export json <file>       export current results to JSON
  history                  recent queries
  favorites                starred queries
  fav                      star or unstar the last query
  chat <message>           ask the assistant about the current results
  exit | quit              leave";

/// Bar length in `chart` output.
const CHART_WIDTH: usize = 40;
/// Rows shown in the default table view.
const TABLE_ROWS: usize = 20;

pub struct App {
    service: Arc<dyn QueryService>,
    assistant: Option<Arc<dyn AssistantService>>,
    kv: Arc<dyn KeyValueStore>,
    session: SessionState,
    chart: ChartSurface<ChartSpec>,
    store: QueryStore,
    transcript: Transcript,
    time_range: TimeRangeSelection,
    last_query_text: Option<String>,
    last_translated: Option<String>,
}

impl App {
    pub fn new(
        service: Arc<dyn QueryService>,
        assistant: Option<Arc<dyn AssistantService>>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let store = QueryStore::load(kv.clone());
        let transcript = Transcript::load(kv.as_ref());
        Self {
            service,
            assistant,
            kv,
            session: SessionState::new(),
            chart: ChartSurface::new(),
            store,
            transcript,
            time_range: TimeRangeSelection::default(),
            last_query_text: None,
            last_translated: None,
        }
    }

    pub async fn interactive(&mut self) -> Result<()> {
        println!("{WELCOME}");
        let stdin = std::io::stdin();
        loop {
            print!("\nquery> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.dispatch(line).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => println!("error: {error:#}"),
            }
        }
        Ok(())
    }

    /// Handle one input line. Returns false when the loop should end.
    async fn dispatch(&mut self, line: &str) -> Result<bool> {
        let lower = line.to_lowercase();
        match lower.as_str() {
            "exit" | "quit" | "q" => return Ok(false),
            "help" => println!("{HELP}"),
            "tables" => self.list_tables().await,
            "samples" => self.list_samples(),
            "stats" => self.show_stats(),
            "report" => self.show_report(),
            "history" => self.show_history(),
            "favorites" => self.show_favorites(),
            "fav" => self.toggle_favorite(),
            _ if lower.starts_with("describe ") => {
                self.describe_table(line[9..].trim()).await?;
            }
            _ if lower.starts_with("kql:") => {
                self.run_kql(line[4..].trim()).await?;
            }
            _ if lower.starts_with("sample ") => {
                self.run_sample(line[7..].trim()).await?;
            }
            _ if lower.starts_with("time ") => {
                self.set_time_range(line[5..].trim())?;
            }
            _ if lower.starts_with("chart ") => {
                self.show_chart(line[6..].trim());
            }
            _ if lower.starts_with("export csv ") => {
                self.export(line[11..].trim(), true)?;
            }
            _ if lower.starts_with("export json ") => {
                self.export(line[12..].trim(), false)?;
            }
            _ if lower.starts_with("chat ") => {
                self.chat(line[5..].trim()).await?;
            }
            _ => self.run_natural(line).await?,
        }
        Ok(true)
    }

    pub async fn run_natural(&mut self, question: &str) -> Result<()> {
        let translated = translate(question);
        let query = self.time_range.apply(&translated, Utc::now());
        println!("KQL: {query}");
        self.execute_and_show(&query, question, &translated, None)
            .await
    }

    pub async fn run_kql(&mut self, kql: &str) -> Result<()> {
        // Raw queries carry their own time filters; bound the service-side
        // window to a day like the original client when none is given
        self.execute_and_show(kql, kql, kql, Some(Duration::days(1)))
            .await
    }

    async fn run_sample(&mut self, name: &str) -> Result<()> {
        match ll_query::sample_query(name) {
            Some(kql) => self.run_kql(kql).await,
            None => {
                println!(
                    "unknown sample; available: {}",
                    ll_query::sample_query_names().join(", ")
                );
                Ok(())
            }
        }
    }

    async fn execute_and_show(
        &mut self,
        query: &str,
        query_text: &str,
        translated: &str,
        timespan: Option<Duration>,
    ) -> Result<()> {
        let response = self.service.execute(query, timespan).await?;
        match self.session.apply_response(response) {
            Ok(()) => {
                let results = self.session.results().context("no results after apply")?;
                self.store
                    .record(query_text, translated, results.row_count(), Utc::now());
                self.last_query_text = Some(query_text.to_string());
                self.last_translated = Some(translated.to_string());
                print_table(results, TABLE_ROWS);
            }
            Err(EngineError::Upstream(message)) => println!("query failed: {message}"),
            Err(error) => return Err(error.into()),
        }
        Ok(())
    }

    pub async fn list_tables(&self) {
        for table in self.service.available_tables().await {
            println!("  {table}");
        }
    }

    async fn describe_table(&mut self, table: &str) -> Result<()> {
        let response = self.service.table_schema(table).await?;
        match self.session.apply_response(response) {
            Ok(()) => {
                if let Some(results) = self.session.results() {
                    print_table(results, usize::MAX);
                }
            }
            Err(error) => println!("describe failed: {error}"),
        }
        Ok(())
    }

    fn list_samples(&self) {
        for category in ll_query::sample_categories() {
            println!("{}:", category.name);
            for query in category.queries {
                println!("  - {query}");
            }
        }
        println!("\nNamed KQL samples (run with `sample <name>`):");
        for name in ll_query::sample_query_names() {
            println!("  {name}");
        }
    }

    fn set_time_range(&mut self, spec: &str) -> Result<()> {
        if let Some(range) = spec.strip_prefix("custom ") {
            let mut parts = range.split_whitespace();
            let start = parts.next().map(parse_instant).transpose()?;
            let end = parts.next().map(parse_instant).transpose()?;
            self.time_range = TimeRangeSelection::Custom { start, end };
        } else if let Some(preset) = TimeRangeSelection::from_preset(spec) {
            self.time_range = preset;
        } else {
            println!("unknown time range; use 1h, 6h, 24h, 7d, 30d, all, or custom");
            return Ok(());
        }
        let clause = self.time_range.resolve(Utc::now());
        if clause.is_empty() {
            println!("time range: all data");
        } else {
            println!("time range clause: {clause}");
        }
        Ok(())
    }

    fn show_stats(&mut self) {
        let Some(results) = self.session.results() else {
            println!("no results yet; run a query first");
            return;
        };
        let report = aggregate(&results.rows, &results.columns);
        let document = render(&report, ReportKind::Statistics, Utc::now(), None);
        println!("{}", to_text(&document));
        self.session.show(ActiveView::Statistics);
    }

    fn show_report(&mut self) {
        let Some(results) = self.session.results() else {
            println!("no results yet; run a query first");
            return;
        };
        let report = aggregate(&results.rows, &results.columns);
        let document = render(&report, ReportKind::Printable, Utc::now(), Some(results));
        println!("{}", to_text(&document));
        self.session.show(ActiveView::Report);
    }

    fn show_chart(&mut self, args: &str) {
        let Some(results) = self.session.results() else {
            println!("no results yet; run a query first");
            return;
        };
        let mut parts = args.split_whitespace();
        let kind = match parts.next().map(str::to_lowercase).as_deref() {
            Some("bar") => ChartKind::Bar,
            Some("pie") => ChartKind::Pie,
            Some("doughnut") => ChartKind::Doughnut,
            Some("line") => ChartKind::Line,
            Some("area") => ChartKind::Area,
            _ => {
                println!("usage: chart <bar|pie|doughnut|line|area> [value column]");
                return;
            }
        };
        let value_column = parts.next();
        let build = build_chart_spec(&results.rows, &results.columns, kind, value_column);
        match build {
            ChartBuild::NotChartable(reason) => {
                self.chart.clear();
                println!("{reason}");
            }
            ChartBuild::Chart(spec) => {
                let mounted = self.chart.mount_with(|| spec);
                print_chart(mounted);
                self.session.show(ActiveView::Chart);
            }
        }
    }

    fn export(&self, filename: &str, as_csv: bool) -> Result<()> {
        let Some(results) = self.session.results() else {
            println!("no results to export; run a query first");
            return Ok(());
        };
        let file = File::create(filename)
            .with_context(|| format!("cannot create {filename}"))?;
        if as_csv {
            ll_core::export::write_csv(results, file)?;
        } else {
            ll_core::export::write_json(results, file)?;
        }
        println!("exported {} rows to {filename}", results.row_count());
        Ok(())
    }

    fn show_history(&self) {
        if self.store.history().is_empty() {
            println!("no history yet");
            return;
        }
        for entry in self.store.history() {
            println!(
                "  {}  {:>6} rows  {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.result_count,
                truncate(&entry.query_text, 60)
            );
        }
    }

    fn show_favorites(&self) {
        if self.store.favorites().is_empty() {
            println!("no favorites yet; run a query and type `fav`");
            return;
        }
        for entry in self.store.favorites() {
            println!("  {}", truncate(&entry.query_text, 60));
            println!("      {}", truncate(&entry.translated_query, 70));
        }
    }

    fn toggle_favorite(&mut self) {
        let (Some(text), Some(translated)) = (
            self.last_query_text.clone(),
            self.last_translated.clone(),
        ) else {
            println!("no query to star; run one first");
            return;
        };
        if self.store.toggle_favorite(&text, &translated, Utc::now()) {
            println!("starred: {}", truncate(&text, 60));
        } else {
            println!("unstarred: {}", truncate(&text, 60));
        }
    }

    async fn chat(&mut self, message: &str) -> Result<()> {
        let Some(assistant) = self.assistant.clone() else {
            println!("assistant not configured; set ASSISTANT_ENDPOINT and ASSISTANT_KEY");
            return Ok(());
        };
        let request = assistant_request(
            message,
            self.session.results(),
            self.last_translated.as_deref(),
            &self.transcript,
        );
        let reply = assistant.send(&request).await?;
        self.transcript.push_user(message);
        self.transcript.push_assistant(&reply.response);
        self.transcript.save(self.kv.as_ref());

        println!("{}", reply.response);
        if let Some(query) = &reply.suggested_query {
            println!("\nsuggested query: {query}");
        }
        for query in &reply.suggested_queries {
            println!("  - {query}");
        }
        Ok(())
    }
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("not an RFC 3339 timestamp: {text}"))
}

/// Plain fixed-width table of the first rows.
fn print_table(results: &ResultSet, limit: usize) {
    if results.is_empty() {
        println!("no results");
        return;
    }
    let shown = results.rows.len().min(limit);
    let cells: Vec<Vec<String>> = results.rows[..shown]
        .iter()
        .map(|row| {
            results
                .columns
                .iter()
                .map(|column| {
                    row.get(column)
                        .map(|value| truncate(&display_string(value), 50))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = results
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = results
        .columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{column:<width$}"))
        .collect();
    println!("{}", header.join("  "));
    println!(
        "{}",
        "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))
    );
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.join("  "));
    }
    if results.rows.len() > shown {
        println!("... {} rows total", results.row_count());
    } else {
        println!("{} rows", results.row_count());
    }
}

/// Textual chart: labels with proportional bars for the first series,
/// remaining series listed by name.
fn print_chart(spec: &ll_analytics::ChartSpec) {
    let Some(first) = spec.series.first() else {
        return;
    };
    let max = first.values.iter().cloned().fold(f64::MIN, f64::max);
    println!(
        "{:?} chart, label: {}, values: {}",
        spec.kind,
        spec.label_column,
        spec.value_columns.join(", ")
    );
    for (label, value) in spec.labels.iter().zip(&first.values) {
        let bar = if max > 0.0 {
            let len = ((value / max) * CHART_WIDTH as f64).round() as usize;
            "#".repeat(len)
        } else {
            String::new()
        };
        println!("  {label:<30} {bar} {value}");
    }
    for series in spec.series.iter().skip(1) {
        println!("  (series: {})", series.name);
    }
}
