//! Experiment result records.

use serde::Serialize;
use thiserror::Error;

use crate::backtest::PortfolioState;
use crate::error::{BacktestError, ErrorCode};
use crate::strategy::StrategyParams;
use crate::walkforward::Window;

/// What happened in one walk-forward window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTrace {
    /// Position in the schedule (0-based).
    pub index: usize,
    /// Window the parameters were fitted on.
    pub train_window: Window,
    /// Window the parameters were applied to.
    pub test_window: Window,
    /// Fitted parameters.
    pub params: StrategyParams,
    /// Score of `params` on the training window.
    pub fit_score: f64,
    /// Objective evaluations spent fitting.
    pub evaluations: usize,
    /// Balances carried into the test window.
    pub starting_balance: PortfolioState,
    /// Balances at the end of the test window.
    pub ending_balance: PortfolioState,
    /// Series dates replayed in the test window.
    pub days: usize,
    /// Trades executed in the test window.
    pub trades: usize,
}

/// Outcome of a walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    /// Balances the run started from.
    pub initial_state: PortfolioState,
    /// Balances after the last completed window.
    pub final_state: PortfolioState,
    /// `final_state` liquidated at the last series price.
    pub final_value: f64,
    /// Price used for liquidation.
    pub last_price: Option<f64>,
    /// Per-window trace in schedule order.
    pub trace: Vec<WindowTrace>,
    /// Whether every scheduled window completed.
    pub complete: bool,
}

impl ExperimentResult {
    /// Close a run: liquidate `final_state` at `last_price`.
    #[must_use]
    pub fn liquidated(
        initial_state: PortfolioState,
        final_state: PortfolioState,
        last_price: Option<f64>,
        trace: Vec<WindowTrace>,
        complete: bool,
    ) -> Self {
        let final_value = last_price.map_or(final_state.fiat, |price| final_state.liquidate(price));
        Self {
            initial_state,
            final_state,
            final_value,
            last_price,
            trace,
            complete,
        }
    }

    /// Number of windows that completed.
    #[must_use]
    pub fn windows_completed(&self) -> usize {
        self.trace.len()
    }
}

/// A run stopped by an error, with everything completed before it.
#[derive(Debug, Clone, Error)]
#[error("Experiment aborted after {} windows: {error}", .partial.trace.len())]
pub struct ExperimentAborted {
    /// The error that stopped the run.
    #[source]
    pub error: BacktestError,
    /// Liquidated state and trace up to the failing window.
    pub partial: Box<ExperimentResult>,
}

/// Buy-every-day run over the evaluable range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineResult {
    /// Range replayed.
    pub window: Window,
    /// Balances at the end of the range.
    pub final_state: PortfolioState,
    /// `final_state` liquidated at the last series price.
    pub final_value: f64,
    /// Series dates replayed.
    pub days: usize,
}

/// Error summary embedded in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl From<&BacktestError> for ReportError {
    fn from(err: &BacktestError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Walk-forward result next to the baseline, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    /// Policy kind searched.
    pub strategy_kind: String,
    /// Walk-forward outcome, partial if `error` is set.
    pub walk_forward: ExperimentResult,
    /// Buy-every-day comparison, absent when the warm-up swallows the series.
    pub baseline: Option<BaselineResult>,
    /// Error that aborted the walk-forward run.
    pub error: Option<ReportError>,
    /// Error that stopped the baseline replay.
    pub baseline_error: Option<ReportError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidated_without_price_keeps_fiat() {
        let state = PortfolioState::fiat_only(250.0);
        let result = ExperimentResult::liquidated(state, state, None, Vec::new(), true);
        assert_eq!(result.final_value, 250.0);
        assert_eq!(result.windows_completed(), 0);
    }

    #[test]
    fn test_aborted_display() {
        let state = PortfolioState::default();
        let aborted = ExperimentAborted {
            error: BacktestError::invalid_config("bad"),
            partial: Box::new(ExperimentResult::liquidated(
                state,
                state,
                Some(1.0),
                Vec::new(),
                false,
            )),
        };
        let display = aborted.to_string();
        assert!(display.contains("after 0 windows"));
        assert!(display.contains("bad"));
    }

    #[test]
    fn test_report_error_from_backtest_error() {
        let err = BacktestError::invalid_config("curve");
        let report = ReportError::from(&err);
        assert_eq!(report.code, ErrorCode::InvalidConfiguration);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "INVALID_CONFIGURATION");
    }
}
