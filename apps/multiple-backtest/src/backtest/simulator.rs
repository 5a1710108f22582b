//! Replay of daily decisions against a portfolio.

use serde::Serialize;
use tracing::debug;

use super::portfolio::PortfolioState;
use crate::data::PriceSeries;
use crate::error::{BacktestError, BacktestResult};
use crate::strategy::{Decision, Policy, TradeAction, TradeSignal, trade_signals};
use crate::walkforward::Window;

/// Outcome of replaying one sequence of decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Balances before the first day.
    pub start: PortfolioState,
    /// Balances after the last day.
    pub end: PortfolioState,
    /// Days processed.
    pub days: usize,
    /// Conversions (full conversion) or purchases (fractional) executed.
    pub trades: usize,
    /// Price on the last processed day.
    pub last_price: Option<f64>,
}

impl ReplaySummary {
    const fn starting_from(start: PortfolioState) -> Self {
        Self {
            start,
            end: start,
            days: 0,
            trades: 0,
            last_price: None,
        }
    }

    /// Ending value at the last processed price, or the ending fiat if no
    /// day was processed.
    #[must_use]
    pub fn liquidated_value(&self) -> f64 {
        self.last_price
            .map_or(self.end.fiat, |price| self.end.liquidate(price))
    }
}

/// Applies decisions day by day.
///
/// Full-conversion actions move the whole balance from one side to the
/// other. Allocations spend a fraction of `daily_budget` plus the fiat
/// rolled over from the previous day. Arithmetic is plain `f64` in a fixed
/// order, so a replay is deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSimulator {
    daily_budget: f64,
}

impl PortfolioSimulator {
    /// Create a simulator.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] if `daily_budget` is
    /// negative or not finite.
    pub fn new(daily_budget: f64) -> BacktestResult<Self> {
        if !daily_budget.is_finite() || daily_budget < 0.0 {
            return Err(BacktestError::invalid_config(format!(
                "daily_budget must be finite and non-negative, got {daily_budget}"
            )));
        }
        Ok(Self { daily_budget })
    }

    /// Fiat added to the budget on every fractional day.
    #[must_use]
    pub const fn daily_budget(&self) -> f64 {
        self.daily_budget
    }

    /// Apply one day's decision, returning the new state and whether a
    /// trade happened.
    #[must_use]
    pub fn step(
        &self,
        state: PortfolioState,
        price: f64,
        decision: Decision,
    ) -> (PortfolioState, bool) {
        match decision {
            Decision::Action(TradeAction::Buy) if state.fiat > 0.0 => (
                PortfolioState {
                    fiat: 0.0,
                    crypto: state.crypto + state.fiat / price,
                },
                true,
            ),
            Decision::Action(TradeAction::Sell) if state.crypto > 0.0 => (
                PortfolioState {
                    fiat: state.fiat + state.crypto * price,
                    crypto: 0.0,
                },
                true,
            ),
            Decision::Action(_) => (state, false),
            Decision::Allocation(fraction) => {
                let budget = self.daily_budget + state.fiat;
                let spend = budget * fraction;
                (
                    PortfolioState {
                        fiat: budget - spend,
                        crypto: state.crypto + spend / price,
                    },
                    spend > 0.0,
                )
            }
        }
    }

    /// Replay a sequence of signals from `start`.
    ///
    /// # Errors
    ///
    /// Propagates the first error yielded by `signals`.
    pub fn replay<I>(&self, signals: I, start: PortfolioState) -> BacktestResult<ReplaySummary>
    where
        I: IntoIterator<Item = BacktestResult<TradeSignal>>,
    {
        let mut summary = ReplaySummary::starting_from(start);
        for signal in signals {
            let signal = signal?;
            self.record(&mut summary, signal.price, signal.decision);
        }
        Ok(summary)
    }

    /// Full-conversion replay of `(price, action)` days.
    #[must_use]
    pub fn replay_actions<I>(&self, days: I, start: PortfolioState) -> ReplaySummary
    where
        I: IntoIterator<Item = (f64, TradeAction)>,
    {
        self.replay_decisions(
            days.into_iter()
                .map(|(price, action)| (price, Decision::Action(action))),
            start,
        )
    }

    /// Fractional replay of `(price, fraction)` days.
    #[must_use]
    pub fn replay_allocations<I>(&self, days: I, start: PortfolioState) -> ReplaySummary
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.replay_decisions(
            days.into_iter()
                .map(|(price, fraction)| (price, Decision::Allocation(fraction))),
            start,
        )
    }

    fn replay_decisions<I>(&self, days: I, start: PortfolioState) -> ReplaySummary
    where
        I: IntoIterator<Item = (f64, Decision)>,
    {
        let mut summary = ReplaySummary::starting_from(start);
        for (price, decision) in days {
            self.record(&mut summary, price, decision);
        }
        summary
    }

    fn record(&self, summary: &mut ReplaySummary, price: f64, decision: Decision) {
        let (next, traded) = self.step(summary.end, price, decision);
        summary.end = next;
        summary.days += 1;
        summary.trades += usize::from(traded);
        summary.last_price = Some(price);
    }

    /// Replay `policy` over the series dates inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InsufficientHistory`] if a date in the window
    /// lacks the trailing history the policy needs.
    pub fn run<P: Policy + ?Sized>(
        &self,
        policy: &P,
        series: &PriceSeries,
        window: &Window,
        start: PortfolioState,
    ) -> BacktestResult<ReplaySummary> {
        let summary = self.replay(trade_signals(policy, series, window), start)?;

        debug!(
            window = %window,
            days = summary.days,
            trades = summary.trades,
            fiat = summary.end.fiat,
            crypto = summary.end.crypto,
            "Replayed window"
        );

        Ok(summary)
    }
}
