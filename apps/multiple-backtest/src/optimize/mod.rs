//! Parameter search.
//!
//! [`Optimizer`] turns a [`ParamSpace`] and a training window into an
//! objective and hands it to a [`SearchOracle`]. The oracle only sees
//! numeric points; decoding into [`crate::strategy::StrategyParams`] stays
//! with the space.

mod optimizer;
mod oracle;
mod progress;
mod space;

pub use optimizer::{FitOutcome, ObjectiveKind, Optimizer};
pub use oracle::{Objective, RandomSearchOracle, SearchOracle, SearchOutcome};
pub use progress::{Progress, ProgressTracker};
pub use space::{CurveSpace, Dimension, ParamSpace, ThresholdSpace};
