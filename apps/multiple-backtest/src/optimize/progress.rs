//! Progress tracking for candidate evaluation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Thread-safe counter of evaluated candidates.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    completed: AtomicU64,
    infeasible: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker expecting `total` evaluations.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: AtomicU64::new(0),
            infeasible: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one finished evaluation.
    pub fn evaluation_completed(&self, feasible: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if !feasible {
            self.infeasible.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current progress snapshot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> Progress {
        let completed = self.completed.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let evals_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Progress {
            total: self.total,
            completed,
            infeasible: self.infeasible.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            evals_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Evaluation budget.
    pub total: u64,
    /// Evaluations finished.
    pub completed: u64,
    /// Evaluations whose candidate was infeasible.
    pub infeasible: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Evaluations per second.
    pub evals_per_sec: f64,
}

impl Progress {
    /// Completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker() {
        let tracker = ProgressTracker::new(10);

        tracker.evaluation_completed(true);
        tracker.evaluation_completed(true);
        tracker.evaluation_completed(false);

        let progress = tracker.progress();
        assert_eq!(progress.total, 10);
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.infeasible, 1);
        assert!((progress.percentage() - 30.0).abs() < 0.1);
    }

    #[test]
    fn test_empty_budget_is_complete() {
        let progress = ProgressTracker::new(0).progress();
        assert_eq!(progress.percentage(), 100.0);
    }
}
