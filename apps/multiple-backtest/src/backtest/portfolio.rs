//! Carried fiat/asset balances.

use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};

/// Fiat and asset balances carried across windows.
///
/// Under fractional replay `fiat` holds the unspent budget rolled over to
/// the next day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Fiat balance.
    pub fiat: f64,
    /// Asset balance in units of the asset.
    pub crypto: f64,
}

impl PortfolioState {
    /// Create a portfolio from starting balances.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if either balance is
    /// negative or not finite.
    pub fn new(fiat: f64, crypto: f64) -> BacktestResult<Self> {
        for (name, value) in [("fiat", fiat), ("crypto", crypto)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BacktestError::invalid_config(format!(
                    "{name} balance must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(Self { fiat, crypto })
    }

    /// Portfolio holding only fiat.
    #[must_use]
    pub const fn fiat_only(fiat: f64) -> Self {
        Self { fiat, crypto: 0.0 }
    }

    /// Value of the portfolio if the asset were sold at `price`.
    #[must_use]
    pub fn liquidate(&self, price: f64) -> f64 {
        self.fiat + self.crypto * price
    }
}
