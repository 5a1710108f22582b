//! Lazy per-day trade signals over a window.

use std::slice;

use chrono::NaiveDate;
use serde::Serialize;

use super::indicator;
use super::policy::{Decision, Policy};
use crate::data::{PricePoint, PriceSeries};
use crate::error::BacktestResult;
use crate::walkforward::Window;

/// Decision for one series date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeSignal {
    /// Series date.
    pub date: NaiveDate,
    /// Price on that date.
    pub price: f64,
    /// Multiple on that date, when the policy uses one.
    pub multiple: Option<f64>,
    /// The policy's decision.
    pub decision: Decision,
}

/// Iterator of [`TradeSignal`]s for every series date inside a window.
///
/// Each item is computed when pulled. Cloning yields an independent
/// iterator starting from the same position, so a sequence can be replayed.
pub struct TradeSignals<'a, P: ?Sized> {
    series: &'a PriceSeries,
    policy: &'a P,
    points: slice::Iter<'a, PricePoint>,
}

impl<P: ?Sized> Clone for TradeSignals<'_, P> {
    fn clone(&self) -> Self {
        Self {
            series: self.series,
            policy: self.policy,
            points: self.points.clone(),
        }
    }
}

impl<'a, P: Policy + ?Sized> TradeSignals<'a, P> {
    /// Signals for the dates of `series` inside `window`.
    #[must_use]
    pub fn new(policy: &'a P, series: &'a PriceSeries, window: &Window) -> Self {
        Self {
            series,
            policy,
            points: series.window(window).iter(),
        }
    }

    fn signal_for(&self, point: &PricePoint) -> BacktestResult<TradeSignal> {
        let multiple = self
            .policy
            .window_length()
            .map(|len| indicator::multiple(point.price, self.series, point.date, len))
            .transpose()?;

        Ok(TradeSignal {
            date: point.date,
            price: point.price,
            multiple,
            decision: self.policy.decide(multiple),
        })
    }
}

impl<P: Policy + ?Sized> Iterator for TradeSignals<'_, P> {
    type Item = BacktestResult<TradeSignal>;

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.points.next()?;
        Some(self.signal_for(point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

impl<P: Policy + ?Sized> ExactSizeIterator for TradeSignals<'_, P> {}

/// Signals of `policy` over the dates of `series` inside `window`.
#[must_use]
pub fn trade_signals<'a, P: Policy + ?Sized>(
    policy: &'a P,
    series: &'a PriceSeries,
    window: &Window,
) -> TradeSignals<'a, P> {
    TradeSignals::new(policy, series, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BacktestError;
    use crate::strategy::{StrategyParams, ThresholdParams, TradeAction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> PriceSeries {
        PriceSeries::from_pairs([
            (date(2023, 1, 1), 100.0),
            (date(2023, 1, 2), 100.0),
            (date(2023, 1, 3), 40.0),
            (date(2023, 1, 4), 100.0),
            (date(2023, 1, 6), 300.0),
        ])
        .unwrap()
    }

    fn params() -> StrategyParams {
        StrategyParams::Threshold(ThresholdParams::new(2, 1.0, 0.5, 2.0).unwrap())
    }

    #[test]
    fn test_signals_cover_series_dates_in_window() {
        let series = series();
        let params = params();
        let window = Window::new(date(2023, 1, 3), date(2023, 1, 7)).unwrap();

        let signals: Vec<_> = trade_signals(&params, &series, &window)
            .collect::<BacktestResult<_>>()
            .unwrap();

        let dates: Vec<_> = signals.iter().map(|s| s.date).collect();
        assert_eq!(dates, [date(2023, 1, 3), date(2023, 1, 4), date(2023, 1, 6)]);

        // 40 / 100 = 0.4 < 0.5
        assert_eq!(signals[0].decision, Decision::Action(TradeAction::Buy));
        // 100 / 70 is inside the band
        assert_eq!(signals[1].decision, Decision::Action(TradeAction::None));
        // 300 / 70 > 2.0
        assert_eq!(signals[2].decision, Decision::Action(TradeAction::Sell));
        assert_eq!(signals[0].multiple, Some(0.4));
    }

    #[test]
    fn test_signals_are_restartable() {
        let series = series();
        let params = params();
        let window = Window::new(date(2023, 1, 3), date(2023, 1, 6)).unwrap();

        let mut first = trade_signals(&params, &series, &window);
        let replay = first.clone();
        let _ = first.next();

        assert_eq!(first.len(), 2);
        assert_eq!(replay.len(), 3);
        let a: Vec<_> = replay.clone().map(Result::unwrap).collect();
        let b: Vec<_> = replay.map(Result::unwrap).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_history_surfaces_at_its_date() {
        let series = series();
        let params = params();
        let window = Window::new(date(2023, 1, 2), date(2023, 1, 3)).unwrap();

        let mut signals = trade_signals(&params, &series, &window);
        let Some(Err(BacktestError::InsufficientHistory { as_of, .. })) = signals.next() else {
            panic!("expected InsufficientHistory on the first date");
        };
        assert_eq!(as_of, date(2023, 1, 2));
        assert!(matches!(signals.next(), Some(Ok(_))));
    }

    #[test]
    fn test_buy_every_day_needs_no_history() {
        let series = series();
        let window = Window::new(date(2023, 1, 1), date(2023, 1, 2)).unwrap();
        let signals: Vec<_> = trade_signals(&StrategyParams::BuyEveryDay, &series, &window)
            .map(Result::unwrap)
            .collect();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| s.multiple.is_none()));
        assert!(
            signals
                .iter()
                .all(|s| s.decision == Decision::Allocation(1.0))
        );
    }
}
