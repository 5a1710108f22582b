//! Configuration loading for the backtester.
//!
//! Configuration is read from YAML, `${VAR}` and `${VAR:-default}`
//! references are replaced from the environment, and the result is
//! validated before use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use multiple_backtest::config::load_config;
//!
//! let config = load_config(Some("backtest.yaml"))?;
//! let experiment = config.build_experiment()?;
//! ```

mod data;
mod observability;
mod portfolio;
mod search;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use data::DataConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use portfolio::PortfolioConfig;
pub use search::SearchConfig;

use crate::backtest::{PortfolioSimulator, PortfolioState};
use crate::error::BacktestResult;
use crate::experiment::Experiment;
use crate::optimize::{Optimizer, ParamSpace};
use crate::walkforward::{SchedulerConfig, WindowScheduler};

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "backtest.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Price data source.
    #[serde(default)]
    pub data: DataConfig,
    /// Window scheduling.
    #[serde(default)]
    pub walkforward: SchedulerConfig,
    /// Starting balances and daily budget.
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    /// Policy kind and its search space.
    #[serde(default)]
    pub strategy: ParamSpace,
    /// Search budget and objective.
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Portfolio the walk-forward run starts from.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BacktestError::InvalidConfiguration`] for negative balances.
    pub fn initial_portfolio(&self) -> BacktestResult<PortfolioState> {
        PortfolioState::new(self.portfolio.initial_fiat, self.portfolio.initial_crypto)
    }

    /// Assemble the experiment described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BacktestError::InvalidConfiguration`] if any section is
    /// inconsistent.
    pub fn build_experiment(&self) -> BacktestResult<Experiment> {
        let scheduler = WindowScheduler::new(self.walkforward)?;
        let simulator = PortfolioSimulator::new(self.portfolio.daily_budget)?;
        let reference =
            PortfolioState::new(self.search.reference_fiat, self.search.reference_crypto)?;
        let optimizer = Optimizer::new(self.search.oracle(), simulator)
            .with_reference(reference)
            .with_objective(self.search.objective);

        Experiment::new(
            scheduler,
            optimizer,
            simulator,
            self.strategy.clone(),
            self.search.max_evaluations,
        )
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to [`DEFAULT_CONFIG_PATH`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. A missing or empty
/// variable without a default becomes an empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |e: crate::BacktestError| ConfigError::ValidationError(e.to_string());

    config.walkforward.validate().map_err(invalid)?;
    config.strategy.validate().map_err(invalid)?;

    if let Some(max_window) = config.strategy.max_window_length() {
        if max_window > config.walkforward.skip_days as usize {
            return Err(ConfigError::ValidationError(format!(
                "strategy window_length can reach {max_window} days \
                 but walkforward.skip_days is {}; \
                 the first training window would lack moving-average history",
                config.walkforward.skip_days
            )));
        }
    }

    if config.data.symbol.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "data.symbol must not be empty".to_string(),
        ));
    }
    if config.data.price_field.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "data.price_field must not be empty".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (config.data.start_date, config.data.end_date) {
        if start > end {
            return Err(ConfigError::ValidationError(format!(
                "data.start_date {start} is after data.end_date {end}"
            )));
        }
    }

    config.initial_portfolio().map_err(invalid)?;
    PortfolioSimulator::new(config.portfolio.daily_budget).map_err(invalid)?;
    PortfolioState::new(config.search.reference_fiat, config.search.reference_crypto)
        .map_err(invalid)?;

    if config.search.max_evaluations == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_evaluations must be at least 1".to_string(),
        ));
    }
    if config.search.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "search.batch_size must be at least 1".to_string(),
        ));
    }

    let format = config.observability.logging.format.to_ascii_lowercase();
    if !LoggingConfig::FORMATS.contains(&format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {:?}",
            LoggingConfig::FORMATS
        )));
    }

    Ok(())
}
