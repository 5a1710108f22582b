//! Walk-forward experiments.
//!
//! Lifecycle of a run: schedule windows, then for each window fit on the
//! training range, replay on the test range and carry the balances
//! forward, then liquidate at the last price.

mod logging;
mod runner;
mod types;

pub use runner::Experiment;
pub use types::{
    BaselineResult, ExperimentAborted, ExperimentReport, ExperimentResult, ReportError,
    WindowTrace,
};
