//! Bounded parameter spaces and their decoding into strategy parameters.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};
use crate::strategy::{AllocationCurve, CurveParams, StrategyParams, ThresholdParams};

/// Sampling distribution of one search dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dimension {
    /// Continuous value drawn uniformly from `[low, high]`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// Uniform value rounded to the nearest multiple of `step`, kept within
    /// `[low, high]`.
    QuantizedUniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
        /// Quantization step.
        step: f64,
    },
    /// Constant value, not searched.
    Fixed {
        /// The value.
        value: f64,
    },
}

impl Dimension {
    /// Shorthand for [`Dimension::Uniform`].
    #[must_use]
    pub const fn uniform(low: f64, high: f64) -> Self {
        Self::Uniform { low, high }
    }

    /// Shorthand for [`Dimension::QuantizedUniform`].
    #[must_use]
    pub const fn quantized(low: f64, high: f64, step: f64) -> Self {
        Self::QuantizedUniform { low, high, step }
    }

    /// Shorthand for [`Dimension::Fixed`].
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self::Fixed { value }
    }

    /// Smallest value the dimension can produce.
    #[must_use]
    pub const fn low(&self) -> f64 {
        match *self {
            Self::Uniform { low, .. } | Self::QuantizedUniform { low, .. } => low,
            Self::Fixed { value } => value,
        }
    }

    /// Largest value the dimension can produce.
    #[must_use]
    pub const fn high(&self) -> f64 {
        match *self {
            Self::Uniform { high, .. } | Self::QuantizedUniform { high, .. } => high,
            Self::Fixed { value } => value,
        }
    }

    /// Check the bounds are finite and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] naming `name`.
    pub fn validate(&self, name: &str) -> BacktestResult<()> {
        let (low, high) = (self.low(), self.high());
        if !low.is_finite() || !high.is_finite() {
            return Err(BacktestError::invalid_config(format!(
                "{name}: bounds must be finite, got [{low}, {high}]"
            )));
        }
        if low > high {
            return Err(BacktestError::invalid_config(format!(
                "{name}: low {low} exceeds high {high}"
            )));
        }
        if let Self::QuantizedUniform { step, .. } = *self {
            if !step.is_finite() || step <= 0.0 {
                return Err(BacktestError::invalid_config(format!(
                    "{name}: step must be finite and positive, got {step}"
                )));
            }
        }
        Ok(())
    }

    /// Draw one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Uniform { low, high } => rng.random_range(low..=high),
            Self::QuantizedUniform { low, high, step } => {
                let raw = rng.random_range(low..=high);
                ((raw / step).round() * step).clamp(low, high)
            }
            Self::Fixed { value } => value,
        }
    }
}

/// Search space of the threshold policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSpace {
    /// Moving average length in days.
    pub window_length: Dimension,
    /// Base threshold on the multiple.
    pub threshold: Dimension,
    /// Buy boundary multiplier.
    pub buy_factor: Dimension,
    /// Sell boundary multiplier.
    pub sell_factor: Dimension,
}

impl Default for ThresholdSpace {
    fn default() -> Self {
        Self {
            window_length: default_window_length(),
            threshold: default_threshold(),
            buy_factor: Dimension::fixed(ThresholdParams::DEFAULT_BUY_FACTOR),
            sell_factor: Dimension::fixed(ThresholdParams::DEFAULT_SELL_FACTOR),
        }
    }
}

/// Search space of the allocation curve policy.
///
/// One threshold dimension is searched per fraction. Sampled thresholds are
/// sorted ascending and paired with `fractions` in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSpace {
    /// Moving average length in days.
    pub window_length: Dimension,
    /// Distribution shared by every curve threshold.
    pub threshold: Dimension,
    /// Spend fractions, strictly descending.
    pub fractions: Vec<f64>,
}

impl Default for CurveSpace {
    fn default() -> Self {
        Self {
            window_length: default_window_length(),
            threshold: default_threshold(),
            fractions: vec![1.0, 0.8, 0.6, 0.4, 0.2],
        }
    }
}

/// Parameter space searched for one policy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamSpace {
    /// Threshold policy.
    Threshold(ThresholdSpace),
    /// Allocation curve policy.
    Curve(CurveSpace),
    /// Buy-every-day policy, nothing to search.
    BuyEveryDay,
}

impl Default for ParamSpace {
    fn default() -> Self {
        Self::Curve(CurveSpace::default())
    }
}

impl ParamSpace {
    /// Named dimensions in the order [`ParamSpace::decode`] expects.
    #[must_use]
    pub fn dimensions(&self) -> Vec<(String, Dimension)> {
        match self {
            Self::Threshold(space) => vec![
                ("window_length".to_string(), space.window_length),
                ("threshold".to_string(), space.threshold),
                ("buy_factor".to_string(), space.buy_factor),
                ("sell_factor".to_string(), space.sell_factor),
            ],
            Self::Curve(space) => {
                std::iter::once(("window_length".to_string(), space.window_length))
                    .chain(
                        (0..space.fractions.len())
                            .map(|i| (format!("threshold_{i}"), space.threshold)),
                    )
                    .collect()
            }
            Self::BuyEveryDay => Vec::new(),
        }
    }

    /// Largest moving average length the space can produce.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn max_window_length(&self) -> Option<usize> {
        let dim = match self {
            Self::Threshold(space) => space.window_length,
            Self::Curve(space) => space.window_length,
            Self::BuyEveryDay => return None,
        };
        Some(dim.high().round().max(0.0) as usize)
    }

    /// Check every dimension and the fixed parts of the template.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if a dimension is
    /// malformed, the window length can fall below one, or the curve
    /// fractions are not strictly descending within `[0, 1]`.
    pub fn validate(&self) -> BacktestResult<()> {
        for (name, dim) in self.dimensions() {
            dim.validate(&name)?;
        }

        match self {
            Self::Threshold(ThresholdSpace { window_length, .. })
            | Self::Curve(CurveSpace { window_length, .. }) => {
                if window_length.low() < 0.5 {
                    return Err(BacktestError::invalid_config(format!(
                        "window_length: low must be at least 1, got {}",
                        window_length.low()
                    )));
                }
            }
            Self::BuyEveryDay => {}
        }

        if let Self::Curve(space) = self {
            // Placeholder thresholds 1..=n are valid, so any error is about the fractions.
            #[allow(clippy::cast_precision_loss)]
            let thresholds: Vec<f64> = (1..=space.fractions.len()).map(|i| i as f64).collect();
            AllocationCurve::from_parts(&thresholds, &space.fractions)?;
        }

        Ok(())
    }

    /// Turn a sampled point into strategy parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if the point has the
    /// wrong arity or decodes to parameters that fail validation (such as
    /// two equal curve thresholds).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn decode(&self, point: &[f64]) -> BacktestResult<StrategyParams> {
        let expected = self.dimensions().len();
        if point.len() != expected {
            return Err(BacktestError::invalid_config(format!(
                "expected {expected} values, got {}",
                point.len()
            )));
        }

        let window_length = |value: f64| value.round().max(0.0) as usize;

        match self {
            Self::Threshold(_) => Ok(StrategyParams::Threshold(ThresholdParams::new(
                window_length(point[0]),
                point[1],
                point[2],
                point[3],
            )?)),
            Self::Curve(space) => {
                let mut thresholds = point[1..].to_vec();
                thresholds.sort_by(f64::total_cmp);
                let curve = AllocationCurve::from_parts(&thresholds, &space.fractions)?;
                Ok(StrategyParams::Curve(CurveParams::new(
                    window_length(point[0]),
                    curve,
                )?))
            }
            Self::BuyEveryDay => Ok(StrategyParams::BuyEveryDay),
        }
    }
}

const fn default_window_length() -> Dimension {
    Dimension::quantized(20.0, 500.0, 1.0)
}

const fn default_threshold() -> Dimension {
    Dimension::uniform(0.5, 3.0)
}
