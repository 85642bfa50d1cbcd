use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cloudlog_kernel::client::{Client, ListEntriesQuery};
use cloudlog_kernel::config::ClientConfig;
use cloudlog_kernel::entries::{format_rfc3339_nanos, Entry, Payload};
use cloudlog_kernel::transport::{ApiRequest, ReplayTransport};

const LOG_LEVEL_ENV: &str = "CLOUDLOG_LOG_LEVEL";

/// Cloudlog entry listing CLI
#[derive(Parser, Debug)]
#[command(name = "cloudlog")]
#[command(about = "List log entries against recorded API responses (dry-run)", long_about = None)]
struct Cli {
    /// Project the client is scoped to
    #[arg(long, env = "CLOUDLOG_PROJECT")]
    project: Option<String>,

    /// Path to client config JSON
    #[arg(long)]
    config: Option<String>,

    /// Path to a JSON array of recorded entries:list responses
    #[arg(long)]
    responses: String,

    /// Path to list query JSON
    #[arg(long)]
    query: Option<String>,

    /// Project to search (repeatable); defaults to the client's project
    #[arg(long = "source-project")]
    source_projects: Vec<String>,

    /// Logging-query filter expression
    #[arg(long)]
    filter: Option<String>,

    /// Sort order, e.g. "timestamp asc" or "timestamp desc"
    #[arg(long)]
    order_by: Option<String>,

    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    page_token: Option<String>,

    /// Keep following nextPageToken until the last page
    #[arg(long)]
    all_pages: bool,
}

#[derive(Debug, Serialize)]
struct EntryOutput {
    logger: String,
    insert_id: String,
    timestamp: String,
    resource: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
    payload_kind: &'static str,
    payload: Value,
}

impl From<&Entry> for EntryOutput {
    fn from(entry: &Entry) -> Self {
        let (payload_kind, payload) = match entry.payload() {
            Payload::Text(text) => ("text", Value::String(text.clone())),
            Payload::Struct(object) => ("struct", Value::Object(object.clone())),
        };

        Self {
            logger: entry.logger().full_name(),
            insert_id: entry.insert_id().to_string(),
            timestamp: format_rfc3339_nanos(entry.timestamp()),
            resource: entry.resource().clone(),
            severity: entry.severity().map(str::to_string),
            labels: entry.labels().clone(),
            payload_kind,
            payload,
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestOutput {
    method: String,
    path: String,
    data: Map<String, Value>,
}

impl From<ApiRequest> for RequestOutput {
    fn from(request: ApiRequest) -> Self {
        Self {
            method: request.method.to_string(),
            path: request.path,
            data: request.data,
        }
    }
}

/// Wrapper for JSON output
#[derive(Debug, Serialize)]
struct CliOutput {
    entries: Vec<EntryOutput>,
    next_page_token: Option<String>,
    requests: Vec<RequestOutput>,
}

fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_LEVEL_ENV)
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(level)?)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(true)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!("logging initialized");
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    // ----------------------------
    // Resolve client config
    // ----------------------------
    let config = match (&cli.config, &cli.project) {
        (_, Some(project)) => ClientConfig::new(project.clone()),
        (Some(path), None) => serde_json::from_str::<ClientConfig>(&fs::read_to_string(path)?)?,
        (None, None) => bail!("either --project or --config is required"),
    };

    // ----------------------------
    // Load recorded responses
    // ----------------------------
    let response_data = fs::read_to_string(&cli.responses)?;
    let responses: Vec<Value> = serde_json::from_str(&response_data)?;
    let transport = Arc::new(ReplayTransport::new(responses));

    let client = Client::from_config(&config, transport.clone())?;

    // ----------------------------
    // Build query
    // ----------------------------
    let mut query = match &cli.query {
        Some(path) => serde_json::from_str::<ListEntriesQuery>(&fs::read_to_string(path)?)?,
        None => ListEntriesQuery::new(),
    };
    if !cli.source_projects.is_empty() {
        query.projects = cli.source_projects.clone();
    }
    if cli.filter.is_some() {
        query.filter = cli.filter.clone();
    }
    if cli.order_by.is_some() {
        query.order_by = cli.order_by.clone();
    }
    if cli.page_size.is_some() {
        query.page_size = cli.page_size;
    }
    if cli.page_token.is_some() {
        query.page_token = cli.page_token.clone();
    }

    // ----------------------------
    // List entries
    // ----------------------------
    let mut entries = Vec::new();
    let next_page_token = loop {
        let page = client.list_entries(&query)?;
        entries.extend(page.entries.iter().map(EntryOutput::from));

        match page.next_page_token {
            Some(token) if cli.all_pages => query.page_token = Some(token),
            token => break token,
        }
    };
    info!(
        project = client.project(),
        entries = entries.len(),
        requests = transport.requested().len(),
        "listing complete"
    );

    // ----------------------------
    // Output
    // ----------------------------
    let output = CliOutput {
        entries,
        next_page_token,
        requests: transport
            .requested()
            .into_iter()
            .map(RequestOutput::from)
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
