//! Moving average and multiple indicators.
//!
//! Both are computed on demand from the series; nothing is cached between
//! decision dates.

use chrono::NaiveDate;

use crate::data::PriceSeries;
use crate::error::{BacktestError, BacktestResult};

/// Mean of the `window_length` most recent prices strictly before `as_of`.
///
/// Prices are summed in chronological order and then divided, so the result
/// is reproducible bit for bit.
///
/// # Errors
///
/// Returns [`BacktestError::InsufficientHistory`] if fewer than
/// `window_length` observations precede `as_of`, and
/// [`BacktestError::InvalidConfiguration`] for a zero `window_length`.
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(
    series: &PriceSeries,
    as_of: NaiveDate,
    window_length: usize,
) -> BacktestResult<f64> {
    if window_length == 0 {
        return Err(BacktestError::invalid_config(
            "window_length must be at least 1",
        ));
    }

    let prior = series.before(as_of);
    if prior.len() < window_length {
        return Err(BacktestError::InsufficientHistory {
            as_of,
            required: window_length,
            available: prior.len(),
        });
    }

    let sum: f64 = prior[prior.len() - window_length..]
        .iter()
        .map(|p| p.price)
        .sum();

    Ok(sum / window_length as f64)
}

/// Ratio of `price` to the moving average as of `as_of`.
///
/// # Errors
///
/// See [`moving_average`].
pub fn multiple(
    price: f64,
    series: &PriceSeries,
    as_of: NaiveDate,
    window_length: usize,
) -> BacktestResult<f64> {
    Ok(price / moving_average(series, as_of, window_length)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walkforward::Window;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::from_pairs([
            (date(2023, 1, 1), 100.0),
            (date(2023, 1, 2), 110.0),
            (date(2023, 1, 3), 120.0),
            (date(2023, 1, 4), 130.0),
            (date(2023, 1, 5), 140.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_moving_average_uses_prior_prices_only() {
        let ma = moving_average(&sample(), date(2023, 1, 5), 2).unwrap();
        assert_eq!(ma, 125.0);
    }

    #[test]
    fn test_multiple_example() {
        let series = sample();
        let ma = moving_average(&series, date(2023, 1, 5), 2).unwrap();
        let m = multiple(140.0, &series, date(2023, 1, 5), 2).unwrap();
        assert_eq!(ma, 125.0);
        assert!((m - 1.12).abs() < 1e-12);
    }

    #[test]
    fn test_multiple_on_four_day_series() {
        let series = PriceSeries::from_pairs([
            (date(2023, 1, 1), 100.0),
            (date(2023, 1, 2), 140.0),
            (date(2023, 1, 3), 120.0),
            (date(2023, 1, 4), 130.0),
        ])
        .unwrap();

        // The two trailing days are Jan 3 and Jan 4.
        let ma = moving_average(&series, date(2023, 1, 5), 2).unwrap();
        let m = multiple(140.0, &series, date(2023, 1, 5), 2).unwrap();
        assert_eq!(ma, 125.0);
        assert!((m - 1.12).abs() < 1e-12);
    }

    #[test]
    fn test_restricted_series_has_no_history_beyond_the_window() {
        let series = sample();
        let window = Window::new(date(2023, 1, 3), date(2023, 1, 5)).unwrap();
        let restricted = series.restrict(&window);

        assert_eq!(moving_average(&restricted, date(2023, 1, 5), 2).unwrap(), 125.0);

        let Err(BacktestError::InsufficientHistory {
            required,
            available,
            ..
        }) = moving_average(&restricted, date(2023, 1, 5), 3)
        else {
            panic!("expected InsufficientHistory");
        };
        assert_eq!(required, 3);
        assert_eq!(available, 2);
    }

    #[test]
    fn test_moving_average_skips_calendar_gaps() {
        let series = PriceSeries::from_pairs([
            (date(2023, 1, 1), 10.0),
            (date(2023, 1, 5), 20.0),
            (date(2023, 1, 9), 30.0),
        ])
        .unwrap();
        // Two most recent rows before Jan 9, regardless of the gap.
        assert_eq!(moving_average(&series, date(2023, 1, 9), 2).unwrap(), 15.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = moving_average(&sample(), date(2023, 1, 5), 0);
        assert!(matches!(
            result,
            Err(BacktestError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_first_date_has_no_history() {
        let result = moving_average(&sample(), date(2023, 1, 1), 1);
        assert!(matches!(
            result,
            Err(BacktestError::InsufficientHistory { available: 0, .. })
        ));
    }
}
