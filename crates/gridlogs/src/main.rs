//! gridlogs - bulk retriever for Grid cluster diagnostic logs
//!
//! Pages through the platform's table storage with a conjunctive filter,
//! under both a row-count ceiling and a wall-clock ceiling, and renders the
//! result to a CSV report. A truncated fetch still produces a report; it just
//! is not complete.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use grid_api::TableClient;
use grid_api::tables::TableCursor;
use gridctl_core::retrieval::{FetchCaps, Page, fetch_all};
use gridctl_core::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod entity;
mod filter;
mod report;

use entity::{OsFlavor, ServiceLogRecord};
use filter::{FilterClause, build_filter};

/// Suffix every service log table name carries
const LOG_TABLE_SUFFIX: &str = "servicelog";

/// Retrieve cluster diagnostic logs into a CSV report
#[derive(Parser, Debug)]
#[command(name = "gridlogs")]
#[command(version, about = "Bulk log retrieval for Grid clusters")]
#[command(after_help = "EXAMPLES:
    # Last two hours' window, table discovered by prefix
    gridlogs --account opslogs --key $KEY --table-prefix etlprod

    # Explicit window and filters
    gridlogs --account opslogs --key $KEY --table etlprod1servicelog \\
        --since 2026-02-01T08:55:00Z --until 2026-02-01T09:10:00Z \\
        --role workernode --trace-level Error
")]
struct Args {
    /// Profile whose [profiles.<name>.storage] section supplies account/key
    #[arg(long, short, env = "GRIDCTL_PROFILE")]
    profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, env = "GRIDCTL_CONFIG_FILE")]
    config_file: Option<String>,

    /// Storage account name
    #[arg(long, env = "GRIDLOGS_ACCOUNT")]
    account: Option<String>,

    /// Storage account key
    #[arg(long, env = "GRIDLOGS_KEY")]
    key: Option<String>,

    /// Storage endpoint suffix
    #[arg(long)]
    endpoint_suffix: Option<String>,

    /// Exact log table name; discovered by prefix when omitted
    #[arg(long)]
    table: Option<String>,

    /// Table name prefix for discovery
    #[arg(long)]
    table_prefix: Option<String>,

    /// Cluster operating system (decides the instance column)
    #[arg(long, value_enum, default_value = "linux")]
    os_type: OsFlavor,

    /// Window start (RFC 3339); two hours ago when omitted
    #[arg(long)]
    since: Option<DateTime<Utc>>,

    /// Window end (RFC 3339); five minutes after the start when omitted
    #[arg(long)]
    until: Option<DateTime<Utc>>,

    /// Only rows from this role (headnode, workernode, ...)
    #[arg(long)]
    role: Option<String>,

    /// Only rows from this node instance
    #[arg(long)]
    instance: Option<String>,

    /// Only rows from this component
    #[arg(long)]
    component: Option<String>,

    /// Only rows at this trace level (Error, Warning, ...)
    #[arg(long)]
    trace_level: Option<String>,

    /// Stop after this many rows even if more match
    #[arg(long, default_value_t = FetchCaps::DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Stop after this many minutes even if more rows match
    #[arg(long, default_value = "15")]
    max_minutes: u64,

    /// Report path; <table>.csv when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let started = std::time::Instant::now();
    run(&args).await?;
    info!(
        elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64()),
        "done"
    );
    Ok(())
}

async fn run(args: &Args) -> Result<()> {
    let (account, key, endpoint_suffix, table, table_prefix) = resolve_storage(args)?;
    let client = TableClient::new(&account, &key, endpoint_suffix.as_deref())?;

    let table = match table {
        Some(table) => table,
        None => discover_table(&client, table_prefix.as_deref()).await?,
    };

    let since = args.since.unwrap_or_else(|| Utc::now() - Duration::hours(2));
    let until = args.until.unwrap_or(since + Duration::minutes(5));
    if until <= since {
        bail!("--until must be after --since");
    }

    let mut clauses = vec![
        FilterClause::time("Timestamp", "gt", since),
        FilterClause::time("Timestamp", "lt", until),
    ];
    if let Some(role) = &args.role {
        clauses.push(FilterClause::text("Role", "eq", role));
    }
    if let Some(instance) = &args.instance {
        let column = match args.os_type {
            OsFlavor::Linux => "Host",
            OsFlavor::Windows => "RoleInstance",
        };
        clauses.push(FilterClause::text(column, "eq", instance));
    }
    if let Some(component) = &args.component {
        clauses.push(FilterClause::text("ComponentName", "eq", component));
    }
    if let Some(level) = &args.trace_level {
        clauses.push(FilterClause::text("TraceLevel", "eq", level));
    }
    let filter = build_filter(&clauses);
    info!(table = %table, filter = %filter, "running segmented query");

    let caps = FetchCaps {
        max_rows: args.max_rows,
        max_elapsed: std::time::Duration::from_secs(args.max_minutes * 60),
    };
    let client_ref = &client;
    let table_ref = table.as_str();
    let filter_ref = filter.as_str();
    let fetched = fetch_all(
        move |cursor: Option<TableCursor>| async move {
            let segment = client_ref
                .query_segmented::<ServiceLogRecord>(table_ref, filter_ref, cursor.as_ref())
                .await?;
            Ok(Page {
                records: segment.rows,
                next: segment.continuation,
            })
        },
        &caps,
        |rows, elapsed| {
            info!(rows, elapsed_secs = format!("{:.2}", elapsed.as_secs_f64()), "rows retrieved");
        },
    )
    .await?;

    if fetched.truncated {
        error!(
            rows = fetched.records.len(),
            "query result is either very large or taking too long, fetch was stopped"
        );
        error!("try reducing the query window or adding more filters; the rows fetched so far are still written to the report");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{table}.csv")));
    report::write_report(&output, args.os_type, &fetched.records)?;
    info!(
        table = %table,
        rows = fetched.records.len(),
        report = %output.display(),
        truncated = fetched.truncated,
        "report written"
    );
    println!(
        "Wrote {} rows to {}{}",
        fetched.records.len(),
        output.display(),
        if fetched.truncated { " (truncated)" } else { "" }
    );
    Ok(())
}

/// Storage settings: flags win, then the profile's storage section.
fn resolve_storage(
    args: &Args,
) -> Result<(String, String, Option<String>, Option<String>, Option<String>)> {
    let storage = load_profile_storage(args)?;

    let account = args
        .account
        .clone()
        .or_else(|| storage.as_ref().map(|s| s.account.clone()))
        .context("no storage account: pass --account or configure [profiles.<name>.storage]")?;
    let key = args
        .key
        .clone()
        .or_else(|| storage.as_ref().map(|s| s.key.clone()))
        .context("no storage key: pass --key or configure [profiles.<name>.storage]")?;
    let endpoint_suffix = args
        .endpoint_suffix
        .clone()
        .or_else(|| storage.as_ref().and_then(|s| s.endpoint_suffix.clone()));
    let table = args
        .table
        .clone()
        .or_else(|| storage.as_ref().and_then(|s| s.table.clone()));
    let table_prefix = args
        .table_prefix
        .clone()
        .or_else(|| storage.as_ref().and_then(|s| s.table_prefix.clone()));

    Ok((account, key, endpoint_suffix, table, table_prefix))
}

fn load_profile_storage(args: &Args) -> Result<Option<gridctl_core::config::StorageSettings>> {
    // With explicit account + key there is no need for a config file at all
    if args.account.is_some() && args.key.is_some() {
        return Ok(None);
    }
    let config = match &args.config_file {
        Some(path) => Config::load_from_path(std::path::Path::new(path))?,
        None => Config::load()?,
    };
    let (_, profile) = config.resolve_profile(args.profile.as_deref())?;
    Ok(profile.storage.clone())
}

/// Find exactly one log table by prefix. Zero or several matches are errors
/// the operator has to resolve by naming the table.
async fn discover_table(client: &TableClient, prefix: Option<&str>) -> Result<String> {
    let prefix = prefix.context("no table: pass --table or --table-prefix")?;
    let mut tables: Vec<String> = client
        .list_tables(prefix)
        .await?
        .into_iter()
        .filter(|name| name.to_lowercase().ends_with(LOG_TABLE_SUFFIX))
        .collect();

    info!(count = tables.len(), "found candidate log tables: {}", tables.join(", "));
    match tables.len() {
        0 => bail!("no '{LOG_TABLE_SUFFIX}' tables found with prefix '{prefix}', try a shorter prefix"),
        1 => Ok(tables.remove(0)),
        _ => bail!(
            "more than one table matches prefix '{prefix}' ({}), pick one with --table",
            tables.join(", ")
        ),
    }
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "gridlogs=info,gridctl_core=warn,grid_api=warn",
            1 => "gridlogs=info,gridctl_core=info,grid_api=info",
            2 => "gridlogs=debug,gridctl_core=debug,grid_api=debug",
            _ => "gridlogs=trace,gridctl_core=trace,grid_api=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
