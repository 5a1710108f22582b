//! Immutable daily price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};
use crate::walkforward::Window;

/// A single `(date, price)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Price in the reporting currency.
    pub price: f64,
}

impl PricePoint {
    /// Create a new observation.
    #[must_use]
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Ordered price history with strictly increasing dates.
///
/// Calendar gaps are allowed and never filled: a date without a row simply
/// has no observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, checking ordering and price values.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidSeries`] if dates are not strictly
    /// increasing or a price is not finite and positive.
    pub fn new(points: Vec<PricePoint>) -> BacktestResult<Self> {
        if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
            return Err(BacktestError::InvalidSeries {
                message: format!(
                    "price on {} must be finite and positive, got {}",
                    bad.date, bad.price
                ),
            });
        }

        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(BacktestError::InvalidSeries {
                message: format!(
                    "dates must be strictly increasing: {} is followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(Self { points })
    }

    /// Build a series from `(date, price)` tuples.
    ///
    /// # Errors
    ///
    /// See [`PriceSeries::new`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> BacktestResult<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, price))
                .collect(),
        )
    }

    /// All observations in chronological order.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest observation.
    #[must_use]
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Latest observation.
    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Date of the earliest observation.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.first().map(|p| p.date)
    }

    /// Date of the latest observation.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.last().map(|p| p.date)
    }

    /// Price of the latest observation.
    #[must_use]
    pub fn last_price(&self) -> Option<f64> {
        self.last().map(|p| p.price)
    }

    /// Price observed on `date`, if a row exists.
    #[must_use]
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].price)
    }

    /// Observations strictly before `date`.
    #[must_use]
    pub fn before(&self, date: NaiveDate) -> &[PricePoint] {
        let end = self.points.partition_point(|p| p.date < date);
        &self.points[..end]
    }

    /// Observations inside the inclusive window.
    #[must_use]
    pub fn window(&self, window: &Window) -> &[PricePoint] {
        let start = self.points.partition_point(|p| p.date < window.start);
        let end = self.points.partition_point(|p| p.date <= window.end);
        if start >= end {
            return &[];
        }
        &self.points[start..end]
    }

    /// Owned sub-series restricted to the inclusive window.
    #[must_use]
    pub fn restrict(&self, window: &Window) -> Self {
        Self {
            points: self.window(window).to_vec(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = BacktestError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::from_pairs([
            (date(2023, 1, 1), 100.0),
            (date(2023, 1, 2), 140.0),
            (date(2023, 1, 3), 120.0),
            (date(2023, 1, 4), 130.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let result =
            PriceSeries::from_pairs([(date(2023, 1, 2), 100.0), (date(2023, 1, 1), 110.0)]);
        let Err(BacktestError::InvalidSeries { message }) = result else {
            panic!("expected InvalidSeries for unsorted dates");
        };
        assert!(message.contains("strictly increasing"));
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let result =
            PriceSeries::from_pairs([(date(2023, 1, 1), 100.0), (date(2023, 1, 1), 110.0)]);
        assert!(matches!(result, Err(BacktestError::InvalidSeries { .. })));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let result = PriceSeries::from_pairs([(date(2023, 1, 1), 0.0)]);
        assert!(matches!(result, Err(BacktestError::InvalidSeries { .. })));
    }

    #[test]
    fn test_window_is_inclusive() {
        let series = sample();
        let window = Window::new(date(2023, 1, 2), date(2023, 1, 3)).unwrap();
        let view = series.window(&window);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].price, 140.0);
        assert_eq!(view[1].price, 120.0);
    }

    #[test]
    fn test_window_outside_series_is_empty() {
        let series = sample();
        let window = Window::new(date(2023, 2, 1), date(2023, 2, 5)).unwrap();
        assert!(series.window(&window).is_empty());
    }

    #[test]
    fn test_before_excludes_the_date_itself() {
        let series = sample();
        let prior = series.before(date(2023, 1, 3));
        assert_eq!(prior.len(), 2);
        assert_eq!(prior[1].date, date(2023, 1, 2));
    }

    #[test]
    fn test_price_on_and_bounds() {
        let series = sample();
        assert_eq!(series.price_on(date(2023, 1, 3)), Some(120.0));
        assert_eq!(series.price_on(date(2023, 1, 9)), None);
        assert_eq!(series.start_date(), Some(date(2023, 1, 1)));
        assert_eq!(series.end_date(), Some(date(2023, 1, 4)));
        assert_eq!(series.last_price(), Some(130.0));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"date":"2023-01-02","price":1.0},{"date":"2023-01-01","price":2.0}]"#;
        let result: Result<PriceSeries, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
