//! Validated strategy parameter records.
//!
//! Every constructor checks its invariants once; afterwards the values are
//! immutable and never re-validated.

use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};

/// Parameters of the buy/sell threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdParams {
    window_length: usize,
    threshold: f64,
    buy_factor: f64,
    sell_factor: f64,
}

impl ThresholdParams {
    /// Default multiplier applied to the threshold for the buy boundary.
    pub const DEFAULT_BUY_FACTOR: f64 = 0.5;
    /// Default multiplier applied to the threshold for the sell boundary.
    pub const DEFAULT_SELL_FACTOR: f64 = 2.0;

    /// Create threshold parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if `window_length` is
    /// zero or any of the floats is not finite and positive.
    pub fn new(
        window_length: usize,
        threshold: f64,
        buy_factor: f64,
        sell_factor: f64,
    ) -> BacktestResult<Self> {
        check_window_length(window_length)?;
        check_positive("threshold", threshold)?;
        check_positive("buy_factor", buy_factor)?;
        check_positive("sell_factor", sell_factor)?;

        Ok(Self {
            window_length,
            threshold,
            buy_factor,
            sell_factor,
        })
    }

    /// Trailing days in the moving average.
    #[must_use]
    pub const fn window_length(&self) -> usize {
        self.window_length
    }

    /// Base threshold on the multiple.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Buy boundary multiplier.
    #[must_use]
    pub const fn buy_factor(&self) -> f64 {
        self.buy_factor
    }

    /// Sell boundary multiplier.
    #[must_use]
    pub const fn sell_factor(&self) -> f64 {
        self.sell_factor
    }

    /// Multiple below which the policy buys.
    #[must_use]
    pub fn buy_below(&self) -> f64 {
        self.threshold * self.buy_factor
    }

    /// Multiple above which the policy sells.
    #[must_use]
    pub fn sell_above(&self) -> f64 {
        self.threshold * self.sell_factor
    }
}

/// One step of an allocation curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Upper (exclusive) bound on the multiple for this step.
    pub threshold: f64,
    /// Fraction of the day's budget to spend.
    pub fraction: f64,
}

/// Monotone mapping from multiple thresholds to spend fractions.
///
/// Thresholds are strictly ascending and fractions strictly descending, so
/// the cheaper the asset relative to its average the more is bought.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationCurve {
    points: Vec<CurvePoint>,
}

impl AllocationCurve {
    /// Create a curve from `(threshold, fraction)` steps.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if the curve is empty,
    /// thresholds are not strictly ascending, fractions are not strictly
    /// descending, or a fraction lies outside `[0, 1]`.
    pub fn new(points: Vec<CurvePoint>) -> BacktestResult<Self> {
        if points.is_empty() {
            return Err(BacktestError::invalid_config(
                "allocation curve needs at least one step",
            ));
        }

        for point in &points {
            if !point.threshold.is_finite() {
                return Err(BacktestError::invalid_config(format!(
                    "curve threshold must be finite, got {}",
                    point.threshold
                )));
            }
            if !(0.0..=1.0).contains(&point.fraction) {
                return Err(BacktestError::invalid_config(format!(
                    "curve fraction must be within [0, 1], got {}",
                    point.fraction
                )));
            }
        }

        for pair in points.windows(2) {
            if pair[0].threshold >= pair[1].threshold {
                return Err(BacktestError::invalid_config(format!(
                    "curve thresholds must be strictly ascending: {} then {}",
                    pair[0].threshold, pair[1].threshold
                )));
            }
            if pair[0].fraction <= pair[1].fraction {
                return Err(BacktestError::invalid_config(format!(
                    "curve fractions must be strictly descending: {} then {}",
                    pair[0].fraction, pair[1].fraction
                )));
            }
        }

        Ok(Self { points })
    }

    /// Create a curve by zipping thresholds with fractions.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if the lengths differ
    /// or the resulting curve is invalid.
    pub fn from_parts(thresholds: &[f64], fractions: &[f64]) -> BacktestResult<Self> {
        if thresholds.len() != fractions.len() {
            return Err(BacktestError::invalid_config(format!(
                "{} thresholds for {} fractions",
                thresholds.len(),
                fractions.len()
            )));
        }

        Self::new(
            thresholds
                .iter()
                .zip(fractions)
                .map(|(&threshold, &fraction)| CurvePoint {
                    threshold,
                    fraction,
                })
                .collect(),
        )
    }

    /// Curve steps in ascending threshold order.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Fraction mapped to the smallest threshold strictly greater than
    /// `multiple`, or `0.0` past the top of the curve.
    #[must_use]
    pub fn fraction_for(&self, multiple: f64) -> f64 {
        let idx = self.points.partition_point(|p| p.threshold <= multiple);
        self.points.get(idx).map_or(0.0, |p| p.fraction)
    }
}

/// Parameters of the graduated allocation policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveParams {
    window_length: usize,
    curve: AllocationCurve,
}

impl CurveParams {
    /// Create curve parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if `window_length` is zero.
    pub fn new(window_length: usize, curve: AllocationCurve) -> BacktestResult<Self> {
        check_window_length(window_length)?;
        Ok(Self {
            window_length,
            curve,
        })
    }

    /// Trailing days in the moving average.
    #[must_use]
    pub const fn window_length(&self) -> usize {
        self.window_length
    }

    /// The allocation curve.
    #[must_use]
    pub const fn curve(&self) -> &AllocationCurve {
        &self.curve
    }
}

/// Parameters of one strategy, tagged by policy kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyParams {
    /// Full buy/sell switching on threshold crossings.
    Threshold(ThresholdParams),
    /// Graduated daily buying along an allocation curve.
    Curve(CurveParams),
    /// Spend the whole daily budget every day.
    BuyEveryDay,
}

impl StrategyParams {
    /// Moving average length, if the policy uses one.
    #[must_use]
    pub const fn window_length(&self) -> Option<usize> {
        match self {
            Self::Threshold(p) => Some(p.window_length),
            Self::Curve(p) => Some(p.window_length),
            Self::BuyEveryDay => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Threshold(_) => "threshold",
            Self::Curve(_) => "curve",
            Self::BuyEveryDay => "buy_every_day",
        }
    }
}

fn check_window_length(window_length: usize) -> BacktestResult<()> {
    if window_length == 0 {
        return Err(BacktestError::invalid_config(
            "window_length must be at least 1",
        ));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> BacktestResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BacktestError::invalid_config(format!(
            "{name} must be finite and positive, got {value}"
        )));
    }
    Ok(())
}
