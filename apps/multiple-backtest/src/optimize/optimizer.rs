//! Parameter fitting on a training window.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::oracle::{RandomSearchOracle, SearchOracle};
use super::space::{Dimension, ParamSpace};
use crate::backtest::{PortfolioSimulator, PortfolioState, ReplaySummary};
use crate::data::PriceSeries;
use crate::error::{BacktestError, BacktestResult};
use crate::strategy::StrategyParams;
use crate::walkforward::Window;

/// Quantity a candidate is scored on. Higher scores are better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Ending portfolio value at the last training price.
    #[default]
    LiquidatedValue,
    /// Units of the asset held at the end of the training window.
    AssetAccumulated,
}

impl ObjectiveKind {
    /// Score a replay.
    #[must_use]
    pub fn score(&self, summary: &ReplaySummary) -> f64 {
        match self {
            Self::LiquidatedValue => summary.liquidated_value(),
            Self::AssetAccumulated => summary.end.crypto,
        }
    }
}

/// Result of fitting one training window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitOutcome {
    /// Best parameters found.
    pub params: StrategyParams,
    /// Score of `params` on the training window.
    pub score: f64,
    /// Objective evaluations used.
    pub evaluations: usize,
    /// Proposals that decoded to invalid parameters.
    pub infeasible: usize,
}

/// Fits strategy parameters on a training window through a search oracle.
///
/// Each candidate is replayed from the same reference portfolio over the
/// series dates inside the training window. The replay sees no observation
/// after the window's last date, so fitting never looks ahead.
#[derive(Debug)]
pub struct Optimizer<O = RandomSearchOracle> {
    oracle: O,
    simulator: PortfolioSimulator,
    reference: PortfolioState,
    objective: ObjectiveKind,
}

impl<O: SearchOracle> Optimizer<O> {
    /// Default reference fiat balance for candidate evaluation.
    pub const DEFAULT_REFERENCE_FIAT: f64 = 1000.0;

    /// Create an optimizer scoring on liquidated value.
    #[must_use]
    pub const fn new(oracle: O, simulator: PortfolioSimulator) -> Self {
        Self {
            oracle,
            simulator,
            reference: PortfolioState::fiat_only(Self::DEFAULT_REFERENCE_FIAT),
            objective: ObjectiveKind::LiquidatedValue,
        }
    }

    /// Set the starting portfolio of every candidate replay.
    #[must_use]
    pub const fn with_reference(mut self, reference: PortfolioState) -> Self {
        self.reference = reference;
        self
    }

    /// Set the objective.
    #[must_use]
    pub const fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    /// The search oracle.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Score `params` over the training window.
    ///
    /// `history` must not extend past `train.end`.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InsufficientHistory`] if a training date
    /// lacks the trailing history the parameters need.
    pub fn evaluate(
        &self,
        params: &StrategyParams,
        history: &PriceSeries,
        train: &Window,
    ) -> BacktestResult<f64> {
        let summary = self.simulator.run(params, history, train, self.reference)?;
        Ok(self.objective.score(&summary))
    }

    /// Search `space` for the parameters scoring best on `train`.
    ///
    /// Proposals that decode to invalid parameters are scored as infinitely
    /// bad instead of failing the search. The oracle is keyed on the first
    /// training date, so refitting the same window gives the same outcome.
    ///
    /// # Errors
    ///
    /// - [`BacktestError::EmptyTrainingWindow`] if no series date falls in `train`
    /// - [`BacktestError::InvalidConfiguration`] if the space is malformed or
    ///   no feasible candidate was found
    /// - [`BacktestError::InsufficientHistory`] from any candidate replay
    pub fn fit(
        &self,
        space: &ParamSpace,
        series: &PriceSeries,
        train: &Window,
        max_evaluations: usize,
    ) -> BacktestResult<FitOutcome> {
        if series.window(train).is_empty() {
            return Err(BacktestError::EmptyTrainingWindow {
                start: train.start,
                end: train.end,
            });
        }
        space.validate()?;

        let history = match series.start_date() {
            Some(start) if start <= train.end => series.restrict(&Window::new(start, train.end)?),
            _ => series.clone(),
        };

        let bounds: Vec<Dimension> = space.dimensions().into_iter().map(|(_, d)| d).collect();
        let infeasible = AtomicUsize::new(0);

        let objective = |point: &[f64]| -> BacktestResult<f64> {
            match space.decode(point) {
                Ok(params) => Ok(-self.evaluate(&params, &history, train)?),
                Err(BacktestError::InvalidConfiguration { .. }) => {
                    infeasible.fetch_add(1, Ordering::Relaxed);
                    Ok(f64::INFINITY)
                }
                Err(err) => Err(err),
            }
        };

        let search_key = u64::from(train.start.num_days_from_ce().unsigned_abs());
        let outcome = self
            .oracle
            .minimize(&objective, &bounds, max_evaluations, search_key)?;

        if !outcome.value.is_finite() {
            return Err(BacktestError::invalid_config(format!(
                "no feasible candidate among {} evaluations for {train}",
                outcome.evaluations
            )));
        }
        let params = space.decode(&outcome.point)?;

        let fit = FitOutcome {
            params,
            score: -outcome.value,
            evaluations: outcome.evaluations,
            infeasible: infeasible.into_inner(),
        };

        info!(
            train = %train,
            oracle = self.oracle.name(),
            kind = fit.params.kind_name(),
            window_length = fit.params.window_length(),
            score = fit.score,
            evaluations = fit.evaluations,
            infeasible = fit.infeasible,
            "Fitted strategy parameters"
        );

        Ok(fit)
    }
}
