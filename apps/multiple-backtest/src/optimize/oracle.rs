//! Black-box minimization oracles.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::progress::ProgressTracker;
use super::space::Dimension;
use crate::error::{BacktestError, BacktestResult};

/// Objective minimized by an oracle. Lower is better.
pub type Objective<'a> = dyn Fn(&[f64]) -> BacktestResult<f64> + Sync + 'a;

/// Best point found by an oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Coordinates of the best point, one per dimension.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Objective evaluations performed.
    pub evaluations: usize,
}

/// Minimizes an objective over a bounded space within an evaluation budget.
///
/// Implementations must never exceed `max_evaluations` calls to the
/// objective and must return the best point they observed. The first
/// objective error aborts the search. The outcome depends only on the
/// arguments: the same `search_key` over the same objective and space
/// yields the same point.
pub trait SearchOracle: Send + Sync {
    /// Search for a minimizer.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InvalidConfiguration`] for a zero budget and
    /// propagates objective errors.
    fn minimize(
        &self,
        objective: &Objective<'_>,
        space: &[Dimension],
        max_evaluations: usize,
        search_key: u64,
    ) -> BacktestResult<SearchOutcome>;

    /// Oracle name for logs.
    fn name(&self) -> &'static str;
}

/// Seeded random search.
///
/// Proposals are drawn sequentially from an RNG seeded with
/// `seed ^ search_key`, so searches with different keys explore different
/// points and no state is kept between calls. Each batch is evaluated in
/// parallel; ties keep the earliest proposal.
#[derive(Debug, Clone, Copy)]
pub struct RandomSearchOracle {
    seed: u64,
    batch_size: usize,
}

impl RandomSearchOracle {
    /// Default number of proposals evaluated together.
    pub const DEFAULT_BATCH_SIZE: usize = 64;

    /// Create an oracle with the default batch size.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size (at least one).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Seed of the base RNG.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl SearchOracle for RandomSearchOracle {
    fn minimize(
        &self,
        objective: &Objective<'_>,
        space: &[Dimension],
        max_evaluations: usize,
        search_key: u64,
    ) -> BacktestResult<SearchOutcome> {
        if max_evaluations == 0 {
            return Err(BacktestError::invalid_config(
                "max_evaluations must be at least 1",
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed ^ search_key);

        // Nothing to search: a single evaluation decides.
        let budget = if space.is_empty() { 1 } else { max_evaluations };
        let tracker = ProgressTracker::new(budget as u64);

        let mut best: Option<(Vec<f64>, f64)> = None;
        let mut evaluations = 0;

        while evaluations < budget {
            let batch = self.batch_size.min(budget - evaluations);
            let proposals: Vec<Vec<f64>> = (0..batch)
                .map(|_| space.iter().map(|dim| dim.sample(&mut rng)).collect())
                .collect();

            let values: Vec<BacktestResult<f64>> = proposals
                .par_iter()
                .map(|point| {
                    let value = objective(point);
                    tracker.evaluation_completed(matches!(value, Ok(v) if v.is_finite()));
                    value
                })
                .collect();

            for (point, value) in proposals.into_iter().zip(values) {
                let value = value?;
                let value = if value.is_nan() { f64::INFINITY } else { value };
                if best.as_ref().is_none_or(|(_, b)| value < *b) {
                    best = Some((point, value));
                }
            }

            evaluations += batch;

            let progress = tracker.progress();
            debug!(
                oracle = self.name(),
                percentage = progress.percentage(),
                completed = progress.completed,
                total = progress.total,
                infeasible = progress.infeasible,
                best = best.as_ref().map(|(_, v)| *v),
                "Search progress"
            );
        }

        let Some((point, value)) = best else {
            return Err(BacktestError::invalid_config(
                "search finished without evaluating a candidate",
            ));
        };

        Ok(SearchOutcome {
            point,
            value,
            evaluations,
        })
    }

    fn name(&self) -> &'static str {
        "random_search"
    }
}
