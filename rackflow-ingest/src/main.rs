//! rackflow-ingest - Rack asset intake
//!
//! Reads pasted rack asset ids, looks each one up in the work-order and
//! inventory services, and writes one JSON Lines record per rack.
//! Logs go to stderr; records go to `--output` or stdout.

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rackflow_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use rackflow_common::Error;
use rackflow_ingest::writer::JsonLinesWriter;
use rackflow_ingest::{IngestConfig, IntakePipeline, IntakeSummary, Overrides};
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rackflow-ingest
#[derive(Parser, Debug)]
#[command(name = "rackflow-ingest")]
#[command(about = "Create rack tracker records from asset ids")]
#[command(version)]
struct Args {
    /// File with asset ids (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Destination for JSON Lines records (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (overrides RACKFLOW_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parallel work-order lookups (1-16)
    #[arg(long, env = "RACKFLOW_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Fetch and normalize only; print field maps instead of writing records
    #[arg(long)]
    dry_run: bool,

    /// Work-order service GraphQL endpoint
    #[arg(long, env = "RACKFLOW_WORK_ORDER_URL")]
    work_order_url: Option<String>,

    /// Inventory service base URL
    #[arg(long, env = "RACKFLOW_INVENTORY_URL")]
    inventory_url: Option<String>,

    /// Cookie header for the work-order service
    #[arg(long, env = "RACKFLOW_WORK_ORDER_COOKIE", hide_env_values = true)]
    work_order_cookie: Option<String>,

    /// Cookie header for the inventory service
    #[arg(long, env = "RACKFLOW_INVENTORY_COOKIE", hide_env_values = true)]
    inventory_cookie: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "RACKFLOW_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Pause between record writes in milliseconds
    #[arg(long, env = "RACKFLOW_ROW_DELAY_MS")]
    row_delay_ms: Option<u64>,

    /// Per-record write timeout in seconds
    #[arg(long, env = "RACKFLOW_WRITE_TIMEOUT_SECS")]
    write_timeout_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            work_order_url: self.work_order_url.clone(),
            inventory_url: self.inventory_url.clone(),
            work_order_cookie: self.work_order_cookie.clone(),
            inventory_cookie: self.inventory_cookie.clone(),
            request_timeout_secs: self.request_timeout_secs,
            concurrency: self.concurrency,
            row_delay_ms: self.row_delay_ms,
            write_timeout_secs: self.write_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // Initialize tracing; stdout is reserved for records
    let default_filter = toml_config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| rackflow_ingest::config::DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting rackflow-ingest {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!(path = %path.display(), "Using config file"),
        Some(path) => warn!(path = %path.display(), "Config file not found, using defaults"),
        None => warn!("No config directory available, using defaults"),
    }

    let config = IngestConfig::resolve(&args.overrides(), &toml_config)
        .context("Invalid configuration")?;

    let text = read_input(&args).await?;
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("no asset ids supplied".to_string()).into());
    }

    let enricher = config
        .build_enricher()
        .map_err(|e| Error::Internal(format!("HTTP client setup failed: {}", e)))?;
    let pipeline = IntakePipeline::new(Arc::new(enricher), config.concurrency, config.orchestrator());

    let mut sink = open_output(&args)?;

    if args.dry_run {
        let summary = match pipeline.dry_run(&text).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Intake aborted");
                return Err(e.into());
            }
        };
        for row in &summary.rows {
            serde_json::to_writer(&mut sink, &row.field_map)?;
            writeln!(sink)?;
        }
        sink.flush()?;
        print_summary(&summary)?;
        return Ok(());
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let mut writer = JsonLinesWriter::new(sink).with_options(config.options.clone());
    let result = pipeline
        .run(&text, &mut writer, &cancel, |totals| {
            info!(
                done = totals.done,
                total = totals.total,
                ok = totals.ok,
                failed = totals.failed,
                "Progress"
            );
        })
        .await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Intake aborted");
            return Err(e.into());
        }
    };

    print_summary(&summary)?;
    Ok(())
}

async fn read_input(args: &Args) -> Result<String> {
    match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read asset ids from stdin")?;
            Ok(text)
        }
    }
}

fn open_output(args: &Args) -> Result<Box<dyn Write + Send>> {
    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

fn print_summary(summary: &IntakeSummary) -> Result<()> {
    if let Some(report) = &summary.report {
        info!(
            run_id = %report.run_id,
            phase = ?report.phase,
            ok = report.totals.ok,
            failed = report.totals.failed,
            skipped = summary.skipped.len(),
            warnings = report.warnings.len() + summary.input_warnings.len(),
            "Intake finished"
        );
    }
    eprintln!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Request a stop of the write phase on Ctrl+C
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("Ctrl+C received; stopping after the current record");
            cancel.cancel();
        }
        Err(e) => error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
