//! Walk-forward window scheduling.
//!
//! Splits the evaluable part of a series into rolling train/test pairs:
//! - Skip: warm-up period that lacks enough trailing history
//! - Train: parameters are fitted here only
//! - Test: the fitted parameters are applied here, unmodified
//! - Roll: the next test window starts the day after the previous one ends

mod builder;
mod scheduler;
mod types;

pub use builder::WalkForwardBuilder;
pub use scheduler::WindowScheduler;
pub use types::{SchedulerConfig, Window, WindowPair};
