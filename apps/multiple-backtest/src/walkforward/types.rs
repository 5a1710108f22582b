//! Core types for walk-forward scheduling.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, BacktestResult};

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
}

impl Window {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> BacktestResult<Self> {
        if start > end {
            return Err(BacktestError::invalid_config(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `days` calendar days beginning at `start`.
    ///
    /// Returns `None` for a zero length or if the end date overflows.
    #[must_use]
    pub fn starting_at(start: NaiveDate, days: u32) -> Option<Self> {
        let last_offset = u64::from(days.checked_sub(1)?);
        let end = start.checked_add_days(Days::new(last_offset))?;
        Some(Self { start, end })
    }

    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the two windows share at least one date.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A training window and the test window that immediately follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPair {
    /// Position in the schedule (0-based).
    pub index: usize,
    /// Window used to fit parameters.
    pub train: Window,
    /// Window the fitted parameters are applied to.
    pub test: Window,
}

/// Scheduling parameters, all in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Warm-up period at the start of the series excluded from evaluation.
    #[serde(default = "default_skip_days")]
    pub skip_days: u32,
    /// Length of every training window.
    #[serde(default = "default_train_length_days")]
    pub train_length_days: u32,
    /// Length of every test window (how often parameters are refit).
    #[serde(default = "default_retrain_frequency_days")]
    pub retrain_frequency_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            skip_days: default_skip_days(),
            train_length_days: default_train_length_days(),
            retrain_frequency_days: default_retrain_frequency_days(),
        }
    }
}

impl SchedulerConfig {
    /// Check the settings describe a valid non-overlapping schedule.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] for zero-length windows
    /// or a training window longer than the retrain frequency, which would
    /// make successive training windows overlap.
    pub fn validate(&self) -> BacktestResult<()> {
        if self.train_length_days == 0 {
            return Err(BacktestError::invalid_config(
                "train_length_days must be at least 1",
            ));
        }
        if self.retrain_frequency_days == 0 {
            return Err(BacktestError::invalid_config(
                "retrain_frequency_days must be at least 1",
            ));
        }
        if self.train_length_days > self.retrain_frequency_days {
            return Err(BacktestError::invalid_config(format!(
                "train_length_days ({}) must not exceed retrain_frequency_days ({}); \
                 training windows would overlap",
                self.train_length_days, self.retrain_frequency_days
            )));
        }
        Ok(())
    }
}

const fn default_skip_days() -> u32 {
    500
}
const fn default_train_length_days() -> u32 {
    30
}
const fn default_retrain_frequency_days() -> u32 {
    30
}
