//! Basket forecast CLI
//!
//! Usage:
//!   basket-forecast --config configs/forecast.toml build
//!   basket-forecast days --days 7
//!   basket-forecast year --year 2024 --output previsoes_2024.csv
//!   basket-forecast config

use anyhow::{Context, Result};
use basket_config::{load_config, ForecastConfig};
use basket_forecast::logging::init_logging;
use basket_forecast::{dataset, log_error, pipeline, ForecastPoint};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "basket-forecast")]
#[command(about = "Crypto basket feature builder and price forecaster")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the feature table from the raw asset, sentiment and event files
    Build {
        /// Output path (defaults to data.feature_table)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Iterative forecast from the most recent row
    Days {
        /// Number of points including day 0 (defaults to forecast.default_days)
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// Batch forecast over one calendar year
    Year {
        /// Calendar year (defaults to forecast.default_year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Also save the forecast as CSV (Date, Close_Previsto, Close_Real)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the resolved configuration (file + environment) as TOML
    Config,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.json_logs) {
        eprintln!("{:#}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(args) {
        log_error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())
        .context("Failed to load forecast configuration")?;

    match args.command {
        Command::Build { output } => {
            if let Some(output) = output {
                config.data.feature_table = output;
            }
            let table = pipeline::build_and_write(&config).context("Feature table build failed")?;
            info!("Built {} rows", table.len());
        }
        Command::Days { days } => {
            let days = days.unwrap_or(config.forecast.default_days);
            let points = pipeline::forecast_n_days(&config, days)
                .with_context(|| format!("{}-day forecast failed", days))?;
            print_points(&rounded(&config, points))?;
        }
        Command::Year { year, output } => {
            let year = year.unwrap_or(config.forecast.default_year);
            let points = pipeline::forecast_year(&config, year)
                .with_context(|| format!("Forecast for {} failed", year))?;
            let points = rounded(&config, points);
            if let Some(output) = output {
                dataset::write_year_forecast(&output, &points)
                    .with_context(|| format!("Failed to save forecast to {}", output.display()))?;
                info!("Saved {} rows to {}", points.len(), output.display());
            }
            print_points(&points)?;
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

fn rounded(config: &ForecastConfig, points: Vec<ForecastPoint>) -> Vec<ForecastPoint> {
    let decimals = config.forecast.decimals;
    points.into_iter().map(|p| p.rounded(decimals)).collect()
}

fn print_points(points: &[ForecastPoint]) -> Result<()> {
    let json = serde_json::to_string_pretty(points).context("Failed to encode forecast")?;
    println!("{}", json);
    Ok(())
}
