use anyhow::Context;
use api_client::{CandleSource, TinkoffClient};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{Config, FormulaKind};
use core_types::{NavCommand, WindowPreset};
use engine::{ChartOutput, ChartPipeline, ChartRequest};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

/// The main entry point for the Candlescope dashboard backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configuration::init_tracing();

    // Parse command-line arguments
    let cli = Cli::parse();
    let mut config = configuration::load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Chart(args) => handle_chart(args, &mut config).await,
        Commands::Shares => handle_shares(&config).await,
        Commands::Serve(args) => {
            let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
            let state = web_server::AppState::from_config(&config)?;
            web_server::run_server(addr.parse()?, state).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Candle-window analytics for T-Invest shares.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file. A missing file falls back to defaults.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one chart pass for an instrument and print the result.
    Chart(ChartArgs),
    /// List the shares that can currently be bought and sold.
    Shares,
    /// Start the dashboard API server.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ChartArgs {
    /// The instrument FIGI (e.g., "BBG004730N88").
    #[arg(long)]
    instrument: String,

    /// Window preset: 1d, 1w, 1m, 6m or 1y.
    #[arg(long)]
    interval: Option<WindowPreset>,

    /// Navigation command applied to the window ending at `--end`.
    #[arg(long)]
    command: Option<NavCommand>,

    /// End of the current window (RFC 3339). Defaults to now.
    #[arg(long)]
    end: Option<DateTime<Utc>>,

    /// Number of bars per vector.
    #[arg(long)]
    window_size: Option<usize>,

    /// Vector formula, overriding the configured one.
    #[arg(long, value_enum)]
    formula: Option<FormulaKind>,

    /// Slider selection start, as a point index.
    #[arg(long, requires = "to_index")]
    from_index: Option<usize>,

    /// Slider selection end, as a point index.
    #[arg(long, requires = "from_index")]
    to_index: Option<usize>,

    /// Keep outliers in the distribution.
    #[arg(long)]
    keep_outliers: bool,

    /// Print the full output as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address, overriding `server.addr`.
    #[arg(long)]
    addr: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn broker_client(config: &Config) -> anyhow::Result<Arc<TinkoffClient>> {
    let client = TinkoffClient::new(&config.api, config.analysis.precision)?;
    Ok(Arc::new(client))
}

async fn handle_chart(args: ChartArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(formula) = args.formula {
        config.analysis.formula = formula;
    }
    let pipeline = ChartPipeline::new(
        broker_client(config)?,
        config.analysis.clone(),
        config.simulation.clone(),
    );

    let mut request = ChartRequest::new(
        args.instrument,
        args.interval.unwrap_or(config.chart.default_interval),
    );
    request.command = args.command;
    request.current_end = args.end;
    request.window_size = args.window_size;
    request.display.filter_outliers = !args.keep_outliers;
    request.selection = args.from_index.zip(args.to_index);

    let output = pipeline.run(&request, Utc::now()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_chart(&output);
    }
    Ok(())
}

fn print_chart(output: &ChartOutput) {
    println!(
        "{} [{}] {} .. {}",
        output.instrument_id,
        output.preset.label(),
        output.window.start().format("%Y-%m-%d %H:%M"),
        output.window.end.format("%Y-%m-%d %H:%M"),
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Time", "Price", "Vector", "Balance"]);

    let mut balances = output.balances.iter().peekable();
    for point in &output.points {
        let balance = balances
            .next_if(|b| b.timestamp == point.timestamp)
            .map(|b| b.balance.round_dp(2).to_string())
            .unwrap_or_default();
        table.add_row(vec![
            point.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            point.price.to_string(),
            point.vector.map(|v| v.round_dp(4).to_string()).unwrap_or_default(),
            balance,
        ]);
    }
    println!("{table}");

    let show = |value: Option<Decimal>| value.map(|v| v.round_dp(4).to_string()).unwrap_or_else(|| "-".to_string());
    println!("Threshold: {}", show(output.threshold));
    if let Some(range) = &output.price_range {
        println!("Price range: {} .. {}", range.min, range.max);
    }
    if let Some(delta) = &output.price_delta {
        println!("Change: {}", delta.summary("₽"));
    }
    println!(
        "Distribution: {} values in {} bins",
        output.distribution.values.len(),
        output.distribution.histogram.len()
    );
    let nav = output.navigation;
    println!(
        "Navigation: first={} prev={} next={} last={}",
        nav.can_go_first, nav.can_go_prev, nav.can_go_next, nav.can_go_last
    );
}

async fn handle_shares(config: &Config) -> anyhow::Result<()> {
    let shares = broker_client(config)?.available_shares().await?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["FIGI", "Share", "First bar"]);
    for share in &shares {
        table.add_row(vec![
            share.figi.clone(),
            share.label(),
            share
                .first_bar_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");
    tracing::info!(count = shares.len(), "Listed tradable shares.");
    Ok(())
}
