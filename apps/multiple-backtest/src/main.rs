//! Multiple Backtest Binary
//!
//! Runs a walk-forward experiment and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! multiple-backtest [config.yaml]
//! ```
//!
//! # Environment Variables
//!
//! - `BACKTEST_CONFIG`: config path when no argument is given (default: backtest.yaml)
//! - `RUST_LOG`: log filter (default: `observability.logging.level`)

use anyhow::{Context, Result, bail};
use multiple_backtest::PriceDataSource;
use multiple_backtest::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use multiple_backtest::telemetry;

fn main() -> Result<()> {
    load_dotenv();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BACKTEST_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = load_config(Some(&path))
        .with_context(|| format!("loading configuration from {path}"))?;

    if let Err(e) = telemetry::init_tracing(&config.observability.logging) {
        eprintln!("Failed to initialize tracing: {e}");
    }

    tracing::info!(config = %path, "Starting multiple backtest");

    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let (start, end) = config.data.date_range();
    let series = config
        .data
        .price_source()
        .fetch(start, end, &config.data.price_field, &config.data.symbol)
        .with_context(|| format!("loading prices for {}", config.data.symbol))?;

    let experiment = config
        .build_experiment()
        .context("building experiment")?;
    let initial = config
        .initial_portfolio()
        .context("reading initial portfolio")?;

    let report = experiment.report(&series, initial);
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");

    if let Some(error) = &report.error {
        bail!("walk-forward run aborted: {}", error.message);
    }
    if let Some(error) = &report.baseline_error {
        bail!("baseline run failed: {}", error.message);
    }
    Ok(())
}

/// Load `.env` from the working directory or its nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
