//! Structured logging for experiment lifecycle events.
//!
//! # Log Levels
//!
//! - **INFO**: run start and end, each completed window
//! - **WARN**: empty schedules
//! - **ERROR**: aborted runs

use tracing::{error, info, warn};

use super::types::{BaselineResult, ExperimentResult, WindowTrace};
use crate::backtest::PortfolioState;
use crate::error::BacktestError;
use crate::walkforward::WindowPair;

/// Log the start of a walk-forward run.
pub fn log_experiment_start(strategy_kind: &str, windows: usize, initial: &PortfolioState) {
    info!(
        strategy_kind,
        windows,
        initial_fiat = initial.fiat,
        initial_crypto = initial.crypto,
        "Walk-forward experiment started"
    );
}

/// Log that no window fits the series.
pub fn log_empty_schedule(initial: &PortfolioState) {
    warn!(
        initial_fiat = initial.fiat,
        initial_crypto = initial.crypto,
        "No walk-forward windows scheduled, returning the initial balance"
    );
}

/// Log a completed window.
pub fn log_window_complete(trace: &WindowTrace) {
    info!(
        index = trace.index,
        train = %trace.train_window,
        test = %trace.test_window,
        kind = trace.params.kind_name(),
        window_length = trace.params.window_length(),
        fit_score = trace.fit_score,
        trades = trace.trades,
        fiat = trace.ending_balance.fiat,
        crypto = trace.ending_balance.crypto,
        "Window complete"
    );
}

/// Log an aborted run.
pub fn log_experiment_aborted(pair: &WindowPair, err: &BacktestError) {
    error!(
        index = pair.index,
        train = %pair.train,
        test = %pair.test,
        code = %err.code(),
        error = %err,
        "Walk-forward experiment aborted"
    );
}

/// Log the final liquidation.
pub fn log_experiment_end(result: &ExperimentResult) {
    info!(
        windows = result.trace.len(),
        complete = result.complete,
        final_value = result.final_value,
        fiat = result.final_state.fiat,
        crypto = result.final_state.crypto,
        last_price = result.last_price,
        "Walk-forward experiment finished"
    );
}

/// Log the baseline outcome.
pub fn log_baseline(baseline: &BaselineResult) {
    info!(
        window = %baseline.window,
        days = baseline.days,
        final_value = baseline.final_value,
        crypto = baseline.final_state.crypto,
        "Buy-every-day baseline finished"
    );
}
