//! LogLens binary: query a Log Analytics workspace with natural language
//! or raw KQL, from flags or an interactive loop.

mod client;
mod config;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ll_store::FileStore;

use crate::client::{HttpAssistantService, HttpQueryService};
use crate::config::Config;
use crate::repl::App;

#[derive(Parser, Debug)]
#[command(
    name = "loglens",
    about = "Query Log Analytics using natural language or KQL"
)]
struct Args {
    /// Execute a single natural language query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Execute a single KQL query and exit
    #[arg(short, long)]
    kql: Option<String>,

    /// Workspace id (overrides AZURE_LOG_ANALYTICS_WORKSPACE_ID)
    #[arg(short, long)]
    workspace: Option<String>,

    /// List available tables and exit
    #[arg(long)]
    list_tables: bool,
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LOGLENS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".loglens")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(workspace) = args.workspace {
        config.workspace_id = Some(workspace);
    }
    config
        .validate()
        .context("set AZURE_LOG_ANALYTICS_WORKSPACE_ID or pass --workspace")?;
    // validate() guarantees the id is present
    let workspace_id = config.workspace_id.clone().unwrap_or_default();

    let service = Arc::new(HttpQueryService::new(config.clone(), workspace_id));
    let assistant: Option<Arc<dyn ll_core::AssistantService>> = if config.assistant_enabled() {
        match (&config.assistant_endpoint, &config.assistant_key) {
            (Some(endpoint), Some(key)) => Some(Arc::new(HttpAssistantService::new(
                endpoint.clone(),
                key.clone(),
                config.assistant_deployment.clone(),
            ))),
            _ => None,
        }
    } else {
        None
    };

    let kv = Arc::new(FileStore::new(data_dir()));
    let mut app = App::new(service, assistant, kv);

    if args.list_tables {
        app.list_tables().await;
    } else if let Some(kql) = args.kql {
        app.run_kql(&kql).await?;
    } else if let Some(question) = args.query {
        app.run_natural(&question).await?;
    } else {
        app.interactive().await?;
    }
    Ok(())
}
