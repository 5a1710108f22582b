//! Error taxonomy for the walk-forward engine.
//!
//! | Variant | Raised by | Recoverable |
//! |---------|-----------|-------------|
//! | `InvalidConfiguration` | parameter / scheduler construction | no, fix the config |
//! | `InsufficientHistory` | moving average | yes, with a larger `skip_days` |
//! | `EmptyTrainingWindow` | optimizer | no, aborts the experiment |
//! | `InvalidSeries` | price series construction | no |
//! | `DataSource` | price data collaborator | depends on the source |
//!
//! A degenerate schedule (train + test longer than the evaluable range) is
//! not an error: it yields an empty schedule and an unchanged balance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the backtest core.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BacktestError {
    /// Malformed strategy parameters or scheduler settings.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong.
        message: String,
    },

    /// Too few observations precede the decision date for the moving average.
    #[error(
        "Insufficient history as of {as_of}: need {required} prior observations, found {available}"
    )]
    InsufficientHistory {
        /// Decision date.
        as_of: NaiveDate,
        /// Observations required (the moving average window length).
        required: usize,
        /// Observations available strictly before `as_of`.
        available: usize,
    },

    /// The training window contains no series dates.
    #[error("Training window {start}..={end} contains no price observations")]
    EmptyTrainingWindow {
        /// Training window start.
        start: NaiveDate,
        /// Training window end.
        end: NaiveDate,
    },

    /// Price series violates ordering or value constraints.
    #[error("Invalid price series: {message}")]
    InvalidSeries {
        /// What was wrong.
        message: String,
    },

    /// The price data collaborator failed.
    #[error("Price data source '{source_name}' failed: {message}")]
    DataSource {
        /// Name of the data source.
        source_name: String,
        /// Error message.
        message: String,
    },
}

impl BacktestError {
    /// Shorthand for an [`BacktestError::InvalidConfiguration`].
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for reports and logs.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            Self::InsufficientHistory { .. } => ErrorCode::InsufficientHistory,
            Self::EmptyTrainingWindow { .. } => ErrorCode::EmptyTrainingWindow,
            Self::InvalidSeries { .. } => ErrorCode::InvalidSeries,
            Self::DataSource { .. } => ErrorCode::DataSource,
        }
    }
}

/// Error codes surfaced in serialized reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// See [`BacktestError::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`BacktestError::InsufficientHistory`].
    InsufficientHistory,
    /// See [`BacktestError::EmptyTrainingWindow`].
    EmptyTrainingWindow,
    /// See [`BacktestError::InvalidSeries`].
    InvalidSeries,
    /// See [`BacktestError::DataSource`].
    DataSource,
}

impl ErrorCode {
    /// Reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::InsufficientHistory => "INSUFFICIENT_HISTORY",
            Self::EmptyTrainingWindow => "EMPTY_TRAINING_WINDOW",
            Self::InvalidSeries => "INVALID_SERIES",
            Self::DataSource => "DATA_SOURCE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Result alias for the backtest core.
pub type BacktestResult<T> = Result<T, BacktestError>;
