//! Builder pattern for walk-forward scheduling.

use super::scheduler::WindowScheduler;
use super::types::SchedulerConfig;
use crate::error::BacktestResult;

/// Builder for a [`WindowScheduler`].
#[derive(Debug, Default)]
pub struct WalkForwardBuilder {
    config: SchedulerConfig,
}

impl WalkForwardBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the warm-up period in days.
    #[must_use]
    pub const fn skip_days(mut self, days: u32) -> Self {
        self.config.skip_days = days;
        self
    }

    /// Set the training window length in days.
    #[must_use]
    pub const fn train_length_days(mut self, days: u32) -> Self {
        self.config.train_length_days = days;
        self
    }

    /// Set the test window length (retrain frequency) in days.
    #[must_use]
    pub const fn retrain_frequency_days(mut self, days: u32) -> Self {
        self.config.retrain_frequency_days = days;
        self
    }

    /// Build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BacktestError::InvalidConfiguration`] if the settings
    /// are inconsistent.
    pub fn build(self) -> BacktestResult<WindowScheduler> {
        WindowScheduler::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let scheduler = WalkForwardBuilder::new()
            .skip_days(200)
            .train_length_days(14)
            .retrain_frequency_days(28)
            .build()
            .unwrap();

        assert_eq!(scheduler.config().skip_days, 200);
        assert_eq!(scheduler.config().train_length_days, 14);
        assert_eq!(scheduler.config().retrain_frequency_days, 28);
    }

    #[test]
    fn test_builder_defaults() {
        let scheduler = WalkForwardBuilder::new().build().unwrap();
        assert_eq!(scheduler.config().skip_days, 500);
        assert_eq!(scheduler.config().retrain_frequency_days, 30);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let result = WalkForwardBuilder::new()
            .train_length_days(40)
            .retrain_frequency_days(20)
            .build();
        assert!(result.is_err());
    }
}
