//! Walk-forward window generation.

use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use super::types::{SchedulerConfig, Window, WindowPair};
use crate::data::PriceSeries;
use crate::error::BacktestResult;

/// Generates chronologically ordered `(train, test)` window pairs.
///
/// Test windows are contiguous, each training window ends the day before
/// its test window starts, and a trailing test window that would run past
/// the end of the series is dropped rather than truncated.
#[derive(Debug, Clone)]
pub struct WindowScheduler {
    config: SchedulerConfig,
}

impl WindowScheduler {
    /// Create a scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BacktestError::InvalidConfiguration`] if the config
    /// fails [`SchedulerConfig::validate`].
    pub fn new(config: SchedulerConfig) -> BacktestResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Access the scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The range left once the warm-up period is skipped, or `None` if the
    /// warm-up swallows the whole series.
    #[must_use]
    pub fn evaluable_range(
        &self,
        series_start: NaiveDate,
        series_end: NaiveDate,
    ) -> Option<Window> {
        let start = series_start.checked_add_days(Days::new(u64::from(self.config.skip_days)))?;
        Window::new(start, series_end).ok()
    }

    /// Generate all window pairs for a series spanning `[series_start, series_end]`.
    ///
    /// An empty vector means the configuration does not fit in the
    /// evaluable range; it is not an error.
    #[must_use]
    pub fn schedule(&self, series_start: NaiveDate, series_end: NaiveDate) -> Vec<WindowPair> {
        let mut pairs = Vec::new();

        let Some(evaluable) = self.evaluable_range(series_start, series_end) else {
            warn!(
                %series_start,
                %series_end,
                skip_days = self.config.skip_days,
                "Warm-up period covers the whole series"
            );
            return pairs;
        };

        let required = i64::from(self.config.train_length_days)
            + i64::from(self.config.retrain_frequency_days);
        if required > evaluable.days() {
            warn!(
                evaluable_days = evaluable.days(),
                required_days = required,
                "Insufficient data for walk-forward analysis"
            );
            return pairs;
        }

        let train_days = Days::new(u64::from(self.config.train_length_days));
        let step = Days::new(u64::from(self.config.retrain_frequency_days));

        let mut test_start = evaluable.start.checked_add_days(train_days);

        while let Some(start) = test_start {
            let Some(test) = Window::starting_at(start, self.config.retrain_frequency_days) else {
                break;
            };
            if test.end > series_end {
                break;
            }

            let (Some(train_start), Some(train_end)) = (
                start.checked_sub_days(train_days),
                start.checked_sub_days(Days::new(1)),
            ) else {
                break;
            };

            pairs.push(WindowPair {
                index: pairs.len(),
                train: Window {
                    start: train_start,
                    end: train_end,
                },
                test,
            });

            test_start = start.checked_add_days(step);
        }

        info!(
            windows = pairs.len(),
            evaluable = %evaluable,
            train_length_days = self.config.train_length_days,
            retrain_frequency_days = self.config.retrain_frequency_days,
            "Generated walk-forward windows"
        );

        pairs
    }

    /// Generate window pairs covering a price series.
    #[must_use]
    pub fn schedule_for(&self, series: &PriceSeries) -> Vec<WindowPair> {
        match (series.start_date(), series.end_date()) {
            (Some(start), Some(end)) => self.schedule(start, end),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> Window {
        Window::new(start, end).unwrap()
    }

    fn scheduler(skip: u32, train: u32, retrain: u32) -> WindowScheduler {
        WindowScheduler::new(SchedulerConfig {
            skip_days: skip,
            train_length_days: train,
            retrain_frequency_days: retrain,
        })
        .unwrap()
    }

    #[test]
    fn test_schedule_matches_expected_pairs() {
        let pairs = scheduler(2, 2, 2).schedule(date(2022, 12, 23), date(2023, 1, 4));

        let expected = [
            (
                window(date(2022, 12, 25), date(2022, 12, 26)),
                window(date(2022, 12, 27), date(2022, 12, 28)),
            ),
            (
                window(date(2022, 12, 27), date(2022, 12, 28)),
                window(date(2022, 12, 29), date(2022, 12, 30)),
            ),
            (
                window(date(2022, 12, 29), date(2022, 12, 30)),
                window(date(2022, 12, 31), date(2023, 1, 1)),
            ),
            (
                window(date(2022, 12, 31), date(2023, 1, 1)),
                window(date(2023, 1, 2), date(2023, 1, 3)),
            ),
        ];

        assert_eq!(pairs.len(), expected.len());
        for (pair, (train, test)) in pairs.iter().zip(expected) {
            assert_eq!(pair.train, train);
            assert_eq!(pair.test, test);
        }
    }

    #[test]
    fn test_partial_trailing_window_dropped() {
        // Jan 4 alone would be a one-day test window: dropped, not truncated.
        let pairs = scheduler(2, 2, 2).schedule(date(2022, 12, 23), date(2023, 1, 4));
        let Some(last) = pairs.last() else {
            panic!("schedule should not be empty");
        };
        assert_eq!(last.test.end, date(2023, 1, 3));
    }

    #[test]
    fn test_degenerate_config_yields_empty_schedule() {
        let pairs = scheduler(5, 10, 10).schedule(date(2023, 1, 1), date(2023, 1, 20));
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_skip_covers_whole_series() {
        let pairs = scheduler(100, 1, 1).schedule(date(2023, 1, 1), date(2023, 1, 20));
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_exact_fit_yields_one_pair() {
        // Evaluable range Jan 3..=Jan 6 is exactly train (2) + test (2).
        let pairs = scheduler(2, 2, 2).schedule(date(2023, 1, 1), date(2023, 1, 6));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].test, window(date(2023, 1, 5), date(2023, 1, 6)));
    }

    #[test]
    fn test_shorter_train_than_test() {
        let pairs = scheduler(0, 3, 7).schedule(date(2023, 1, 1), date(2023, 1, 31));
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].train, window(date(2023, 1, 1), date(2023, 1, 3)));
        assert_eq!(pairs[0].test, window(date(2023, 1, 4), date(2023, 1, 10)));
        assert_eq!(pairs[1].train, window(date(2023, 1, 8), date(2023, 1, 10)));
    }

    #[test]
    fn test_rejects_zero_lengths() {
        let result = WindowScheduler::new(SchedulerConfig {
            skip_days: 0,
            train_length_days: 0,
            retrain_frequency_days: 5,
        });
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_windows_ordered_and_disjoint(
            skip in 0u32..60,
            train in 1u32..20,
            extra in 0u32..20,
            span in 0i64..400,
        ) {
            let retrain = train + extra;
            let start = date(2020, 1, 1);
            let end = start + chrono::Duration::days(span);
            let pairs = scheduler(skip, train, retrain).schedule(start, end);

            for pair in &pairs {
                prop_assert_eq!(pair.train.end + chrono::Duration::days(1), pair.test.start);
                prop_assert_eq!(pair.train.days(), i64::from(train));
                prop_assert_eq!(pair.test.days(), i64::from(retrain));
                prop_assert!(pair.test.end <= end);
                prop_assert!(pair.train.start >= start + chrono::Duration::days(i64::from(skip)));
            }

            for w in pairs.windows(2) {
                prop_assert!(w[0].test.start < w[1].test.start);
                prop_assert!(w[0].train.start < w[1].train.start);
                prop_assert!(!w[0].test.overlaps(&w[1].test));
                prop_assert!(!w[0].train.overlaps(&w[1].train));
                prop_assert_eq!(w[0].test.end + chrono::Duration::days(1), w[1].test.start);
            }
        }
    }
}
