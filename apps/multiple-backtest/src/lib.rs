// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Multiple Backtest - Walk-Forward Engine
//!
//! Backtests moving-average "multiple" strategies (price divided by its
//! trailing moving average) with a rolling walk-forward protocol.
//!
//! # Architecture
//!
//! Leaf-first:
//!
//! - `data`: `PriceSeries` and the price data source port with its adapters
//! - `strategy`: validated parameters, indicators, policies, trade signals
//! - `backtest`: `PortfolioState` and the replaying `PortfolioSimulator`
//! - `walkforward`: chronological train/test window scheduling
//! - `optimize`: parameter spaces, search oracles, the `Optimizer`
//! - `experiment`: the fold over windows that carries the portfolio forward
//! - `config` / `telemetry`: YAML configuration and tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use multiple_backtest::config::load_config;
//!
//! let config = load_config(None)?;
//! let experiment = config.build_experiment()?;
//! let report = experiment.report(&series, config.initial_portfolio()?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod optimize;
pub mod strategy;
pub mod telemetry;
pub mod walkforward;

pub use backtest::{PortfolioSimulator, PortfolioState, ReplaySummary};
pub use data::{PriceDataSource, PricePoint, PriceSeries};
pub use error::{BacktestError, BacktestResult, ErrorCode};
pub use experiment::{Experiment, ExperimentAborted, ExperimentReport, ExperimentResult};
pub use optimize::{
    FitOutcome, ObjectiveKind, Optimizer, ParamSpace, RandomSearchOracle, SearchOracle,
};
pub use strategy::{Decision, Policy, StrategyParams, TradeAction};
pub use walkforward::{Window, WindowPair, WindowScheduler};
