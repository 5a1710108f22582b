//! Moving-average multiple strategies.
//!
//! A strategy is one of a closed set of parameter variants
//! ([`StrategyParams`]), each implementing [`Policy`]. Policies turn the
//! day's multiple (price over its trailing moving average) into either a
//! full-conversion [`TradeAction`] or a budget fraction.

mod indicator;
mod params;
mod policy;
mod signals;

pub use indicator::{moving_average, multiple};
pub use params::{AllocationCurve, CurveParams, CurvePoint, StrategyParams, ThresholdParams};
pub use policy::{Decision, Policy, TradeAction};
pub use signals::{TradeSignal, TradeSignals, trade_signals};
