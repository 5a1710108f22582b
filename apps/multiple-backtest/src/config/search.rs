//! Parameter search configuration.

use serde::{Deserialize, Serialize};

use crate::optimize::{ObjectiveKind, RandomSearchOracle};

/// Search budget, seed and objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Objective evaluations per training window.
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
    /// Seed of the random search.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Candidates evaluated in parallel per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// What a candidate is scored on.
    #[serde(default)]
    pub objective: ObjectiveKind,
    /// Fiat balance every candidate replay starts from.
    #[serde(default = "default_reference_fiat")]
    pub reference_fiat: f64,
    /// Asset balance every candidate replay starts from.
    #[serde(default)]
    pub reference_crypto: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_evaluations: default_max_evaluations(),
            seed: default_seed(),
            batch_size: default_batch_size(),
            objective: ObjectiveKind::default(),
            reference_fiat: default_reference_fiat(),
            reference_crypto: 0.0,
        }
    }
}

impl SearchConfig {
    /// Random search oracle for this configuration.
    #[must_use]
    pub fn oracle(&self) -> RandomSearchOracle {
        RandomSearchOracle::new(self.seed).with_batch_size(self.batch_size)
    }
}

const fn default_max_evaluations() -> usize {
    500
}

const fn default_seed() -> u64 {
    42
}

const fn default_batch_size() -> usize {
    RandomSearchOracle::DEFAULT_BATCH_SIZE
}

const fn default_reference_fiat() -> f64 {
    1000.0
}
