//! Price data collaborator port and adapters.
//!
//! The core only ever sees a [`PriceSeries`]; fetching, column selection and
//! renaming to the canonical `date`/`price` pair happen here.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::series::{PricePoint, PriceSeries};
use crate::error::{BacktestError, BacktestResult};

/// Placeholder substituted with the symbol in file path templates.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Source of historical prices.
pub trait PriceDataSource: Send + Sync {
    /// Fetch `price_field` for `symbol` between `start` and `end` (inclusive),
    /// renamed to the canonical `price` column and sorted ascending by date.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::DataSource`] if the symbol or field is unknown
    /// or the underlying storage cannot be read, and
    /// [`BacktestError::InvalidSeries`] if the rows contain duplicate dates.
    fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        price_field: &str,
        symbol: &str,
    ) -> BacktestResult<PriceSeries>;

    /// Get the name of this data source.
    fn name(&self) -> &'static str;
}

/// A raw row with a date and any number of named price columns
/// (`Open`, `High`, `Close`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Observation date.
    pub date: NaiveDate,
    /// Named price columns.
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}

impl PriceRecord {
    /// Create a record with a single named field.
    #[must_use]
    pub fn single(date: NaiveDate, field: &str, value: f64) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), value);
        Self { date, fields }
    }
}

/// Select one column from raw records inside `[start, end]` and build the
/// canonical series.
fn select_field(
    source_name: &'static str,
    records: &[PriceRecord],
    start: NaiveDate,
    end: NaiveDate,
    price_field: &str,
) -> BacktestResult<PriceSeries> {
    let mut points = Vec::new();

    for record in records.iter().filter(|r| r.date >= start && r.date <= end) {
        let price = record
            .fields
            .get(price_field)
            .copied()
            .ok_or_else(|| BacktestError::DataSource {
                source_name: source_name.to_string(),
                message: format!("row {} has no '{price_field}' column", record.date),
            })?;
        points.push(PricePoint::new(record.date, price));
    }

    points.sort_by_key(|p| p.date);
    PriceSeries::new(points)
}

/// In-memory data source for testing.
#[derive(Debug, Default)]
pub struct InMemoryPriceSource {
    data: HashMap<String, Vec<PriceRecord>>,
}

impl InMemoryPriceSource {
    /// Create a new empty in-memory data source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records for a symbol, replacing any previous ones.
    pub fn add_records(&mut self, symbol: &str, records: Vec<PriceRecord>) {
        self.data.insert(symbol.to_string(), records);
    }
}

impl PriceDataSource for InMemoryPriceSource {
    fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        price_field: &str,
        symbol: &str,
    ) -> BacktestResult<PriceSeries> {
        let records = self
            .data
            .get(symbol)
            .ok_or_else(|| BacktestError::DataSource {
                source_name: self.name().to_string(),
                message: format!("no data for symbol '{symbol}'"),
            })?;

        select_field(self.name(), records, start, end, price_field)
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }
}

/// Reads a JSON array of [`PriceRecord`]s from disk.
///
/// The path may contain `{symbol}`, e.g. `data/{symbol}.json`.
#[derive(Debug, Clone)]
pub struct JsonFilePriceSource {
    path_template: String,
}

impl JsonFilePriceSource {
    /// Create a source reading from `path_template`.
    #[must_use]
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            path_template: path_template.into(),
        }
    }

    /// Resolve the file path for a symbol.
    #[must_use]
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        PathBuf::from(self.path_template.replace(SYMBOL_PLACEHOLDER, symbol))
    }

    fn read_records(&self, path: &Path) -> BacktestResult<Vec<PriceRecord>> {
        let contents = std::fs::read_to_string(path).map_err(|e| BacktestError::DataSource {
            source_name: self.name().to_string(),
            message: format!("failed to read '{}': {e}", path.display()),
        })?;

        serde_json::from_str(&contents).map_err(|e| BacktestError::DataSource {
            source_name: self.name().to_string(),
            message: format!("failed to parse '{}': {e}", path.display()),
        })
    }
}

impl PriceDataSource for JsonFilePriceSource {
    fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        price_field: &str,
        symbol: &str,
    ) -> BacktestResult<PriceSeries> {
        let path = self.path_for(symbol);
        debug!(path = %path.display(), symbol, "Reading price file");

        let records = self.read_records(&path)?;
        let series = select_field(self.name(), &records, start, end, price_field)?;

        info!(
            symbol,
            price_field,
            rows = series.len(),
            start = ?series.start_date(),
            end = ?series.end_date(),
            "Loaded price series"
        );

        Ok(series)
    }

    fn name(&self) -> &'static str {
        "JsonFile"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records() -> Vec<PriceRecord> {
        vec![
            PriceRecord::single(date(2023, 1, 2), "Open", 110.0),
            PriceRecord::single(date(2023, 1, 1), "Open", 100.0),
            PriceRecord::single(date(2023, 1, 3), "Open", 120.0),
        ]
    }

    #[test]
    fn test_in_memory_fetch_sorts_and_filters() {
        let mut source = InMemoryPriceSource::new();
        source.add_records("BTC-USD", records());

        let series = source
            .fetch(date(2023, 1, 1), date(2023, 1, 2), "Open", "BTC-USD")
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].price, 100.0);
        assert_eq!(series.points()[1].price, 110.0);
    }

    #[test]
    fn test_in_memory_unknown_symbol() {
        let source = InMemoryPriceSource::new();
        let result = source.fetch(date(2023, 1, 1), date(2023, 1, 2), "Open", "ETH-USD");
        assert!(matches!(result, Err(BacktestError::DataSource { .. })));
    }

    #[test]
    fn test_missing_field_is_reported() {
        let mut source = InMemoryPriceSource::new();
        source.add_records("BTC-USD", records());

        let result = source.fetch(date(2023, 1, 1), date(2023, 1, 3), "Close", "BTC-USD");
        let Err(BacktestError::DataSource { message, .. }) = result else {
            panic!("expected DataSource error for missing column");
        };
        assert!(message.contains("Close"));
    }

    #[test]
    fn test_json_file_source_renames_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BTC-USD.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[
                {{"date": "2023-01-01", "Open": 100.0, "Close": 105.0}},
                {{"date": "2023-01-02", "Open": 110.0, "Close": 115.0}}
            ]"#
        )
        .unwrap();

        let template = dir.path().join("{symbol}.json");
        let source = JsonFilePriceSource::new(template.to_string_lossy().to_string());
        let series = source
            .fetch(date(2023, 1, 1), date(2023, 12, 31), "Close", "BTC-USD")
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last_price(), Some(115.0));
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let source = JsonFilePriceSource::new("/nonexistent/{symbol}.json");
        let result = source.fetch(date(2023, 1, 1), date(2023, 1, 2), "Open", "BTC-USD");
        assert!(matches!(result, Err(BacktestError::DataSource { .. })));
    }
}
