//! Walk-forward experiment loop.

use super::logging;
use super::types::{
    BaselineResult, ExperimentAborted, ExperimentReport, ExperimentResult, ReportError, WindowTrace,
};
use crate::backtest::{PortfolioSimulator, PortfolioState};
use crate::data::PriceSeries;
use crate::error::{BacktestError, BacktestResult};
use crate::optimize::{Optimizer, ParamSpace, RandomSearchOracle, SearchOracle};
use crate::strategy::StrategyParams;
use crate::walkforward::{WindowPair, WindowScheduler};

/// Fits and replays every scheduled window, carrying the portfolio forward.
///
/// The run is a fold over the schedule with the [`PortfolioState`] as
/// accumulator: each window is fitted on its training range, replayed on
/// its test range from the carried state, and its ending state seeds the
/// next window. After the last window the state is liquidated at the last
/// series price. The first error stops the run; no window is retried or
/// skipped.
#[derive(Debug)]
pub struct Experiment<O = RandomSearchOracle> {
    scheduler: WindowScheduler,
    optimizer: Optimizer<O>,
    simulator: PortfolioSimulator,
    space: ParamSpace,
    max_evaluations: usize,
}

impl<O: SearchOracle> Experiment<O> {
    /// Create an experiment.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if the space is
    /// malformed or `max_evaluations` is zero.
    pub fn new(
        scheduler: WindowScheduler,
        optimizer: Optimizer<O>,
        simulator: PortfolioSimulator,
        space: ParamSpace,
        max_evaluations: usize,
    ) -> BacktestResult<Self> {
        space.validate()?;
        if max_evaluations == 0 {
            return Err(BacktestError::invalid_config(
                "max_evaluations must be at least 1",
            ));
        }
        Ok(Self {
            scheduler,
            optimizer,
            simulator,
            space,
            max_evaluations,
        })
    }

    /// The window scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &WindowScheduler {
        &self.scheduler
    }

    /// The searched parameter space.
    #[must_use]
    pub const fn space(&self) -> &ParamSpace {
        &self.space
    }

    /// Run the walk-forward experiment from `initial`.
    ///
    /// An empty schedule is not an error: the result is `initial`
    /// liquidated at the last price.
    ///
    /// # Errors
    ///
    /// Returns [`ExperimentAborted`] with the partial result if fitting or
    /// replaying a window fails.
    pub fn run(
        &self,
        series: &PriceSeries,
        initial: PortfolioState,
    ) -> Result<ExperimentResult, ExperimentAborted> {
        let pairs = self.scheduler.schedule_for(series);
        logging::log_experiment_start(self.kind_name(), pairs.len(), &initial);
        if pairs.is_empty() {
            logging::log_empty_schedule(&initial);
        }

        let mut state = initial;
        let mut trace = Vec::with_capacity(pairs.len());

        for pair in &pairs {
            match self.run_window(series, pair, state) {
                Ok(window) => {
                    logging::log_window_complete(&window);
                    state = window.ending_balance;
                    trace.push(window);
                }
                Err(error) => {
                    logging::log_experiment_aborted(pair, &error);
                    let partial = ExperimentResult::liquidated(
                        initial,
                        state,
                        series.last_price(),
                        trace,
                        false,
                    );
                    logging::log_experiment_end(&partial);
                    return Err(ExperimentAborted {
                        error,
                        partial: Box::new(partial),
                    });
                }
            }
        }

        let result =
            ExperimentResult::liquidated(initial, state, series.last_price(), trace, true);
        logging::log_experiment_end(&result);
        Ok(result)
    }

    /// Run the experiment and the buy-every-day baseline into one report.
    ///
    /// Failures of either run are reported in `error` and `baseline_error`
    /// rather than returned.
    #[must_use]
    pub fn report(&self, series: &PriceSeries, initial: PortfolioState) -> ExperimentReport {
        let (walk_forward, error) = match self.run(series, initial) {
            Ok(result) => (result, None),
            Err(aborted) => (*aborted.partial, Some(ReportError::from(&aborted.error))),
        };

        let (baseline, baseline_error) = match self.baseline(series, initial) {
            Ok(baseline) => (baseline, None),
            Err(err) => (None, Some(ReportError::from(&err))),
        };

        ExperimentReport {
            strategy_kind: self.kind_name().to_string(),
            walk_forward,
            baseline,
            error,
            baseline_error,
        }
    }

    /// Buy every day over the evaluable range from `initial`.
    ///
    /// Returns `None` when the warm-up period covers the whole series.
    ///
    /// # Errors
    ///
    /// Propagates replay errors.
    pub fn baseline(
        &self,
        series: &PriceSeries,
        initial: PortfolioState,
    ) -> BacktestResult<Option<BaselineResult>> {
        let (Some(start), Some(end)) = (series.start_date(), series.end_date()) else {
            return Ok(None);
        };
        let Some(window) = self.scheduler.evaluable_range(start, end) else {
            return Ok(None);
        };

        let summary = self
            .simulator
            .run(&StrategyParams::BuyEveryDay, series, &window, initial)?;
        let final_value = series
            .last_price()
            .map_or(summary.end.fiat, |price| summary.end.liquidate(price));

        let baseline = BaselineResult {
            window,
            final_state: summary.end,
            final_value,
            days: summary.days,
        };
        logging::log_baseline(&baseline);
        Ok(Some(baseline))
    }

    fn run_window(
        &self,
        series: &PriceSeries,
        pair: &WindowPair,
        start: PortfolioState,
    ) -> BacktestResult<WindowTrace> {
        let fit = self
            .optimizer
            .fit(&self.space, series, &pair.train, self.max_evaluations)?;
        let summary = self.simulator.run(&fit.params, series, &pair.test, start)?;

        Ok(WindowTrace {
            index: pair.index,
            train_window: pair.train,
            test_window: pair.test,
            params: fit.params,
            fit_score: fit.score,
            evaluations: fit.evaluations,
            starting_balance: start,
            ending_balance: summary.end,
            days: summary.days,
            trades: summary.trades,
        })
    }

    const fn kind_name(&self) -> &'static str {
        match self.space {
            ParamSpace::Threshold(_) => "threshold",
            ParamSpace::Curve(_) => "curve",
            ParamSpace::BuyEveryDay => "buy_every_day",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::optimize::{Dimension, ThresholdSpace};
    use crate::walkforward::WalkForwardBuilder;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(days: u64) -> PriceSeries {
        let start = date(2023, 1, 1);
        PriceSeries::from_pairs((0..days).map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64;
            (start + Days::new(i), 100.0 + 25.0 * (t / 4.0).sin() + t * 0.5)
        }))
        .unwrap()
    }

    fn experiment(skip: u32, train: u32, retrain: u32, space: ParamSpace) -> Experiment {
        let scheduler = WalkForwardBuilder::new()
            .skip_days(skip)
            .train_length_days(train)
            .retrain_frequency_days(retrain)
            .build()
            .unwrap();
        let simulator = PortfolioSimulator::new(0.0).unwrap();
        let optimizer = Optimizer::new(RandomSearchOracle::new(11), simulator);
        Experiment::new(scheduler, optimizer, simulator, space, 20).unwrap()
    }

    fn threshold_space() -> ParamSpace {
        ParamSpace::Threshold(ThresholdSpace {
            window_length: Dimension::quantized(2.0, 8.0, 1.0),
            threshold: Dimension::uniform(0.8, 1.2),
            buy_factor: Dimension::uniform(0.85, 1.0),
            sell_factor: Dimension::uniform(1.0, 1.15),
        })
    }

    #[test]
    fn test_empty_schedule_returns_initial_fiat() {
        let exp = experiment(50, 30, 30, threshold_space());
        let result = exp.run(&series(60), PortfolioState::fiat_only(1000.0)).unwrap();
        assert!(result.trace.is_empty());
        assert!(result.complete);
        assert_eq!(result.final_value, 1000.0);
    }

    #[test]
    fn test_state_carries_between_windows() {
        let exp = experiment(10, 10, 10, threshold_space());
        let result = exp.run(&series(120), PortfolioState::fiat_only(1000.0)).unwrap();

        assert!(result.complete);
        assert!(result.trace.len() >= 2);
        assert_eq!(result.trace[0].starting_balance, PortfolioState::fiat_only(1000.0));
        for pair in result.trace.windows(2) {
            assert_eq!(pair[0].ending_balance, pair[1].starting_balance);
            assert_eq!(pair[0].test_window.end.succ_opt(), Some(pair[1].test_window.start));
        }

        let Some(last) = result.trace.last() else {
            panic!("trace should not be empty");
        };
        assert_eq!(result.final_state, last.ending_balance);
        let last_price = series(120).last_price().unwrap();
        assert_eq!(result.final_value, last.ending_balance.liquidate(last_price));
    }

    #[test]
    fn test_insufficient_history_aborts_with_partial_result() {
        // Skip shorter than the window length: the first fit cannot compute averages.
        let space = ParamSpace::Threshold(ThresholdSpace {
            window_length: Dimension::fixed(40.0),
            ..ThresholdSpace::default()
        });
        let exp = experiment(5, 10, 10, space);
        let Err(aborted) = exp.run(&series(120), PortfolioState::fiat_only(500.0)) else {
            panic!("expected the run to abort");
        };

        assert!(matches!(
            aborted.error,
            BacktestError::InsufficientHistory { .. }
        ));
        assert!(!aborted.partial.complete);
        assert!(aborted.partial.trace.is_empty());
        assert_eq!(aborted.partial.final_value, 500.0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let a = experiment(10, 10, 10, threshold_space())
            .run(&series(90), PortfolioState::fiat_only(1000.0))
            .unwrap();
        let b = experiment(10, 10, 10, threshold_space())
            .run(&series(90), PortfolioState::fiat_only(1000.0))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rerunning_one_experiment_gives_same_result() {
        let exp = experiment(10, 10, 10, threshold_space());
        let series = series(90);
        let a = exp.run(&series, PortfolioState::fiat_only(1000.0)).unwrap();
        let b = exp.run(&series, PortfolioState::fiat_only(1000.0)).unwrap();

        assert!(a.trace.len() >= 2);
        for (first, second) in a.trace.iter().zip(&b.trace) {
            assert_eq!(first.params, second.params);
        }
        assert_eq!(a.final_value, b.final_value);
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_includes_baseline() {
        let exp = experiment(10, 10, 10, threshold_space());
        let report = exp.report(&series(60), PortfolioState::fiat_only(300.0));

        assert_eq!(report.strategy_kind, "threshold");
        assert!(report.error.is_none());
        assert!(report.baseline_error.is_none());
        let Some(baseline) = report.baseline else {
            panic!("baseline expected");
        };
        assert_eq!(baseline.window.start, date(2023, 1, 11));
        assert_eq!(baseline.days, 50);
        // Zero daily budget: the initial fiat is spent on the first day.
        assert_eq!(baseline.final_state.fiat, 0.0);
        assert!(baseline.final_state.crypto > 0.0);
    }

    #[test]
    fn test_report_carries_error() {
        let space = ParamSpace::Threshold(ThresholdSpace {
            window_length: Dimension::fixed(40.0),
            ..ThresholdSpace::default()
        });
        let report =
            experiment(5, 10, 10, space).report(&series(60), PortfolioState::fiat_only(1.0));
        let Some(error) = report.error else {
            panic!("error expected");
        };
        assert_eq!(error.code, crate::ErrorCode::InsufficientHistory);
        assert!(!report.walk_forward.complete);
        // The baseline does not depend on the fitted window length.
        assert!(report.baseline_error.is_none());
        assert!(report.baseline.is_some());
    }

    #[test]
    fn test_rejects_zero_budget() {
        let scheduler = WalkForwardBuilder::new().build().unwrap();
        let simulator = PortfolioSimulator::new(0.0).unwrap();
        let optimizer = Optimizer::new(RandomSearchOracle::new(0), simulator);
        let result = Experiment::new(scheduler, optimizer, simulator, ParamSpace::default(), 0);
        assert!(result.is_err());
    }
}
