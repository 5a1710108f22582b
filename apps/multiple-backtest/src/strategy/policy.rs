//! Decision rules for each policy variant.

use serde::{Deserialize, Serialize};

use super::params::{CurveParams, StrategyParams, ThresholdParams};

/// Action of the threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// Convert all fiat into the asset.
    Buy,
    /// Convert all of the asset into fiat.
    Sell,
    /// Do nothing.
    None,
}

/// Per-day output of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Decision {
    /// Full-conversion action.
    Action(TradeAction),
    /// Fraction of the day's budget to spend, within `[0, 1]`.
    Allocation(f64),
}

/// Capability shared by every policy variant.
///
/// A policy maps the day's multiple to a [`Decision`]. Policies that ignore
/// the multiple report no window length and receive `None`.
pub trait Policy: Send + Sync {
    /// Moving average length needed to compute the multiple.
    fn window_length(&self) -> Option<usize>;

    /// Decide what to do given the day's multiple.
    fn decide(&self, multiple: Option<f64>) -> Decision;
}

impl ThresholdParams {
    /// Buy strictly below the lower boundary, sell strictly above the upper
    /// one; a multiple equal to either boundary is [`TradeAction::None`].
    #[must_use]
    pub fn action_for(&self, multiple: f64) -> TradeAction {
        if multiple < self.buy_below() {
            TradeAction::Buy
        } else if multiple > self.sell_above() {
            TradeAction::Sell
        } else {
            TradeAction::None
        }
    }
}

impl Policy for ThresholdParams {
    fn window_length(&self) -> Option<usize> {
        Some(Self::window_length(self))
    }

    fn decide(&self, multiple: Option<f64>) -> Decision {
        Decision::Action(multiple.map_or(TradeAction::None, |m| self.action_for(m)))
    }
}

impl Policy for CurveParams {
    fn window_length(&self) -> Option<usize> {
        Some(Self::window_length(self))
    }

    fn decide(&self, multiple: Option<f64>) -> Decision {
        Decision::Allocation(multiple.map_or(0.0, |m| self.curve().fraction_for(m)))
    }
}

impl Policy for StrategyParams {
    fn window_length(&self) -> Option<usize> {
        Self::window_length(self)
    }

    fn decide(&self, multiple: Option<f64>) -> Decision {
        match self {
            Self::Threshold(p) => p.decide(multiple),
            Self::Curve(p) => p.decide(multiple),
            Self::BuyEveryDay => Decision::Allocation(1.0),
        }
    }
}
