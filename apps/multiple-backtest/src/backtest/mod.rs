//! Portfolio replay.
//!
//! [`PortfolioSimulator`] folds daily decisions into a [`PortfolioState`].
//! The state is a plain value: each replay takes a starting state and
//! returns the ending one, leaving ownership with the caller.

mod portfolio;
mod simulator;

pub use portfolio::PortfolioState;
pub use simulator::{PortfolioSimulator, ReplaySummary};
