//! Portfolio configuration.

use serde::{Deserialize, Serialize};

/// Starting balances and daily budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Fiat balance at the start of the run.
    #[serde(default)]
    pub initial_fiat: f64,
    /// Asset balance at the start of the run.
    #[serde(default)]
    pub initial_crypto: f64,
    /// Fiat added every day under fractional replay.
    #[serde(default = "default_daily_budget")]
    pub daily_budget: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_fiat: 0.0,
            initial_crypto: 0.0,
            daily_budget: default_daily_budget(),
        }
    }
}

const fn default_daily_budget() -> f64 {
    1000.0
}
