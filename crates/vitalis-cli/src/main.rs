//! Vitalis CLI - Command Line Interface
//!
//! Command-line tool for turning raw health records into chart-ready marks.
//! Reads records as JSON, applies a chart configuration, and prints the
//! resulting marks as JSON on stdout. Logs go to stderr.
//!
//! Key Features:
//! - Interval and point record pipelines
//! - TOML chart configuration with domain presets
//! - Per-run overrides for unit, aggregation, channel and gap filling
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vitalis_common::{AggregationType, ChartConfig, DashboardConfig, Result, TimeUnit, VitalisError};
use vitalis_timeseries::{generate_label, ChartPipeline, RawRecord};

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "vitalis")]
#[command(author = "Vitalis Development Team")]
#[command(version = "0.1.0")]
#[command(about = "Vitalis health chart pipeline", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bucket raw records and print chart marks
    Chart {
        /// JSON file holding an array of records
        #[arg(short, long)]
        input: PathBuf,
        /// Treat records as point measurements instead of intervals
        #[arg(long)]
        points: bool,
        /// TOML chart configuration
        #[arg(short, long, conflicts_with = "preset")]
        config: Option<PathBuf>,
        /// Built-in configuration (steps, heart_rate, sleep, blood_pressure, nutrition)
        #[arg(short, long)]
        preset: Option<String>,
        /// TOML dashboard holding several `[charts.<name>]` tables
        #[arg(long, conflicts_with_all = ["config", "preset"], requires = "chart")]
        dashboard: Option<PathBuf>,
        /// Chart to use from the dashboard
        #[arg(long, requires = "dashboard")]
        chart: Option<String>,
        #[arg(short, long)]
        unit: Option<TimeUnit>,
        #[arg(short, long)]
        aggregation: Option<AggregationType>,
        /// Plot only this channel
        #[arg(long)]
        channel: Option<String>,
        /// Keep missing buckets out of the output
        #[arg(long)]
        no_fill: bool,
        /// Fill gaps from this instant
        #[arg(long, requires = "until")]
        since: Option<DateTime<Utc>>,
        /// Fill gaps up to this instant
        #[arg(long, requires = "since")]
        until: Option<DateTime<Utc>>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the built-in chart configurations as TOML
    Presets,
    /// Print the label generated for a timestamp
    Label {
        unit: TimeUnit,
        timestamp: DateTime<Utc>,
    },
}

// =============================================================================
// Configuration
// =============================================================================

fn load_chart_config(
    config: Option<PathBuf>,
    preset: Option<String>,
    dashboard: Option<PathBuf>,
    chart: Option<String>,
) -> Result<ChartConfig> {
    if let (Some(path), Some(name)) = (dashboard, chart) {
        let dashboard = DashboardConfig::from_file(&path)?;
        return dashboard.chart(&name).cloned().ok_or_else(|| {
            VitalisError::Configuration(format!("no chart '{}' in {}", name, path.display()))
        });
    }
    match (config, preset) {
        (Some(path), _) => ChartConfig::from_file(&path),
        (None, Some(name)) => ChartConfig::preset(&name)
            .ok_or_else(|| VitalisError::Configuration(format!("unknown preset: {}", name))),
        (None, None) => Ok(ChartConfig::default()),
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    if let Err(e) = run(cli.command) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(if e.is_user_error() { 2 } else { 1 });
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Chart {
            input,
            points,
            config,
            preset,
            dashboard,
            chart: chart_name,
            unit,
            aggregation,
            channel,
            no_fill,
            since,
            until,
            pretty,
        } => {
            let mut chart = load_chart_config(config, preset, dashboard, chart_name)?;
            if let Some(unit) = unit {
                chart.target_unit = unit;
            }
            if let Some(aggregation) = aggregation {
                chart.aggregation = aggregation;
            }
            if channel.is_some() {
                chart.channel = channel;
            }
            if no_fill {
                chart.fill_gaps = false;
            }

            let content = std::fs::read_to_string(&input)?;
            let records: Vec<RawRecord> =
                serde_json::from_str(&content).map_err(|e| VitalisError::Serialization(e.to_string()))?;
            tracing::info!(
                "Charting {} records from {} ({} {})",
                records.len(),
                input.display(),
                chart.target_unit,
                chart.aggregation
            );

            let mut pipeline = ChartPipeline::new(chart)?;
            if let (Some(start), Some(end)) = (since, until) {
                pipeline = pipeline.with_window(start, end);
            }
            let result = if points {
                pipeline.run_points(&records)?
            } else {
                pipeline.run_intervals(&records)?
            };
            tracing::info!(
                "Produced {} marks from {} buckets ({} records skipped)",
                result.stats.marks,
                result.stats.buckets,
                result.stats.records_skipped
            );

            let rendered = if pretty {
                serde_json::to_string_pretty(&result.output)
            } else {
                serde_json::to_string(&result.output)
            }
            .map_err(|e| VitalisError::Serialization(e.to_string()))?;
            println!("{}", rendered);
        }
        Commands::Presets => {
            print!("{}", DashboardConfig::presets().to_toml_string()?);
        }
        Commands::Label { unit, timestamp } => {
            println!("{}", generate_label(timestamp, unit));
        }
    }
    Ok(())
}
