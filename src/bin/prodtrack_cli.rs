use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use prodtrack_api::{
    client::{is_not_found, AppSnapshot, Dashboard, TrackerClient},
    services::{
        plans::{CompletionView, PlanView},
        records::RecordFilter,
    },
};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = TrackerClient::new(cli.server.clone()).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Plans => handle_plans(&client, cli.json).await?,
        Commands::Records(filter) => handle_records(&client, filter, cli.json).await?,
        Commands::Completion(args) => handle_completion(&client, args, cli.json).await?,
        Commands::Delete(args) => handle_delete(&client, args, cli.json).await?,
        Commands::Stats(filter) => handle_stats(&client, filter, cli.json).await?,
        Commands::Watch(args) => handle_watch(client, args).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "prodtrack", about = "Production tracking client", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PRODTRACK_SERVER",
        default_value = "http://localhost:8080",
        help = "Base URL of the production tracking server"
    )]
    server: String,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plans with per-process completion
    Plans,
    /// Records matching the filters, newest first
    Records(FilterArgs),
    /// Completion of a single product
    Completion(CompletionArgs),
    /// Delete records by id
    Delete(DeleteArgs),
    /// Totals and average rates
    Stats(FilterArgs),
    /// Keep plan completion on screen, refreshing periodically
    Watch(WatchArgs),
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, help = "Earliest date, inclusive (YYYY-MM-DD)")]
    start_date: Option<NaiveDate>,
    #[arg(long, help = "Latest date, inclusive (YYYY-MM-DD)")]
    end_date: Option<NaiveDate>,
    #[arg(long, help = "Employee name")]
    name: Option<String>,
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    process: Option<String>,
    #[arg(long, help = "Adjustment master name")]
    adjustment_master: Option<String>,
}

impl From<FilterArgs> for RecordFilter {
    fn from(args: FilterArgs) -> Self {
        RecordFilter {
            start_date: args.start_date,
            end_date: args.end_date,
            name: args.name,
            product: args.product,
            process: args.process,
            adjustment_master: args.adjustment_master,
        }
    }
}

#[derive(Args)]
struct CompletionArgs {
    #[arg(long)]
    product: String,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(required = true, help = "Record ids")]
    ids: Vec<i32>,
}

#[derive(Args)]
struct WatchArgs {
    #[arg(
        long,
        env = "PRODTRACK_REFRESH_SECS",
        default_value_t = 30,
        help = "Seconds between refreshes"
    )]
    interval: u64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_completion_rows(rows: &[CompletionView]) {
    for row in rows {
        println!(
            "  {:<20} {:>10} / {:<10} {:>8}%  {}",
            row.process, row.actual_qty, row.planned_qty, row.completion_rate, row.band
        );
    }
}

async fn handle_plans(client: &TrackerClient, json: bool) -> Result<()> {
    let plans: Vec<PlanView> = client
        .list_plans()
        .await
        .context("failed to fetch production plans")?;

    if json {
        return print_json(&plans);
    }
    if plans.is_empty() {
        println!("No production plans configured");
    }
    for plan in &plans {
        println!("{}", plan.product);
        if plan.completion.is_empty() {
            println!("  (no processes configured)");
        }
        print_completion_rows(&plan.completion);
    }
    Ok(())
}

async fn handle_records(client: &TrackerClient, filter: FilterArgs, json: bool) -> Result<()> {
    let records = client
        .list_records(&filter.into())
        .await
        .context("failed to fetch records")?;

    if json {
        return print_json(&records);
    }
    for record in &records {
        println!(
            "#{:<6} {} {:<12} {:<16} {:<16} qty {:<8} capacity {:<8} time {}",
            record.id,
            record.date,
            record.name,
            record.product,
            record.process,
            record.actual_qty,
            record.capacity_rate,
            record.time_rate
        );
    }
    println!("{} records", records.len());
    Ok(())
}

async fn handle_completion(client: &TrackerClient, args: CompletionArgs, json: bool) -> Result<()> {
    let report = client
        .completion(&args.product)
        .await
        .with_context(|| format!("failed to fetch completion for {}", args.product))?;

    if json {
        return print_json(&report);
    }
    if !report.configured {
        println!("{}: no production plan configured", report.product);
        return Ok(());
    }
    println!("{}", report.product);
    print_completion_rows(&report.processes);
    Ok(())
}

async fn handle_delete(client: &TrackerClient, args: DeleteArgs, json: bool) -> Result<()> {
    let outcome = client.batch_delete(&args.ids).await;

    if json {
        return print_json(&outcome);
    }
    println!("Deleted {} of {} records", outcome.deleted.len(), args.ids.len());
    if !outcome.failed.is_empty() {
        println!("Failed: {:?}", outcome.failed);
        anyhow::bail!("{} deletions failed", outcome.failed.len());
    }
    Ok(())
}

async fn handle_stats(client: &TrackerClient, filter: FilterArgs, json: bool) -> Result<()> {
    let stats = match client.statistics(&filter.into()).await {
        Ok(stats) => stats,
        Err(e) if is_not_found(&e) => anyhow::bail!("statistics endpoint not available"),
        Err(e) => return Err(e).context("failed to fetch statistics"),
    };

    if json {
        return print_json(&stats);
    }
    println!("Records:           {}", stats.total_records);
    println!("Total actual qty:  {}", stats.total_actual_qty);
    println!("Avg capacity rate: {}%", stats.avg_capacity_rate);
    println!("Avg time rate:     {}%", stats.avg_time_rate);
    Ok(())
}

fn render_snapshot(snapshot: &AppSnapshot) {
    println!(
        "--- {} ({} records) ---",
        snapshot.loaded_at.format("%Y-%m-%d %H:%M:%S"),
        snapshot.records.len()
    );
    for plan in &snapshot.plans {
        println!("{}", plan.product);
        print_completion_rows(&plan.completion);
    }
}

async fn handle_watch(client: TrackerClient, args: WatchArgs) -> Result<()> {
    let period = Duration::from_secs(args.interval.max(1));
    let dashboard = Arc::new(Dashboard::new(client));
    dashboard
        .reload()
        .await
        .context("failed to load initial snapshot")?;

    let refresher = dashboard.clone().spawn_refresh(period);
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                // a failed refresh keeps showing the last good snapshot
                if let Some(snapshot) = dashboard.current().await {
                    render_snapshot(&snapshot);
                }
            }
        }
    }

    refresher.abort();
    Ok(())
}
