//! Price data configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::JsonFilePriceSource;

/// Where prices come from and which column to use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON file path, `{symbol}` is replaced with `symbol`.
    #[serde(default = "default_path")]
    pub path: String,
    /// Ticker symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Price column to read, such as `Open` or `Close`.
    #[serde(default = "default_price_field")]
    pub price_field: String,
    /// First date to load (inclusive). Unbounded when absent.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last date to load (inclusive). Unbounded when absent.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            symbol: default_symbol(),
            price_field: default_price_field(),
            start_date: None,
            end_date: None,
        }
    }
}

impl DataConfig {
    /// Inclusive date range to fetch.
    #[must_use]
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (
            self.start_date.unwrap_or(NaiveDate::MIN),
            self.end_date.unwrap_or(NaiveDate::MAX),
        )
    }

    /// File-backed price source for this configuration.
    #[must_use]
    pub fn price_source(&self) -> JsonFilePriceSource {
        JsonFilePriceSource::new(self.path.clone())
    }
}

fn default_path() -> String {
    "data/{symbol}.json".to_string()
}

fn default_symbol() -> String {
    "BTC-USD".to_string()
}

fn default_price_field() -> String {
    "Open".to_string()
}
