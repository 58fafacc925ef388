//! Weight/value function: action + goal -> scalar benefit.
//!
//! value = scale * (affinity * goal_weight + cash * norm_cash + risk * norm_risk)
//!
//! `norm_cash` divides by the largest |monthly_cashflow_delta| in the catalog
//! and `norm_risk` by the largest risk score, so both land in [-1, 1] / [0, 1]
//! regardless of the catalog's units.

use crate::action::ActionRecord;
use crate::goal::Goal;
use serde::{Deserialize, Serialize};

/// Catalog-wide denominators. Each falls back to 1.0 when the catalog has no
/// non-zero value for that attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    cash_scale: f64,
    risk_scale: f64,
}

impl Normalizer {
    pub fn from_actions(actions: &[ActionRecord]) -> Self {
        let max_cash = actions
            .iter()
            .map(|a| a.monthly_cashflow_delta.abs())
            .fold(0.0_f64, f64::max);
        let max_risk = actions
            .iter()
            .map(|a| a.risk_reduction_score.abs())
            .fold(0.0_f64, f64::max);

        Self {
            cash_scale: if max_cash > 0.0 { max_cash } else { 1.0 },
            risk_scale: if max_risk > 0.0 { max_risk } else { 1.0 },
        }
    }

    pub fn cash(&self, action: &ActionRecord) -> f64 {
        action.monthly_cashflow_delta / self.cash_scale
    }

    pub fn risk(&self, action: &ActionRecord) -> f64 {
        action.risk_reduction_score / self.risk_scale
    }
}

/// The three additive parts of an action's value, already scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueBreakdown {
    pub goal: f64,
    pub cash: f64,
    pub risk: f64,
}

impl ValueBreakdown {
    pub fn total(&self) -> f64 {
        self.goal + self.cash + self.risk
    }
}

pub fn value_breakdown(
    action: &ActionRecord,
    goal: Goal,
    norm: &Normalizer,
    scale: f64,
) -> ValueBreakdown {
    let profile = goal.profile();
    ValueBreakdown {
        goal: scale * profile.affinity * action.goal_weights.for_goal(goal),
        cash: scale * profile.cash * norm.cash(action),
        risk: scale * profile.risk * norm.risk(action),
    }
}

pub fn value(action: &ActionRecord, goal: Goal, norm: &Normalizer, scale: f64) -> f64 {
    value_breakdown(action, goal, norm, scale).total()
}

/// Per-action values in catalog order.
pub fn value_vector(actions: &[ActionRecord], goal: Goal, scale: f64) -> Vec<f64> {
    let norm = Normalizer::from_actions(actions);
    actions
        .iter()
        .map(|a| value(a, goal, &norm, scale))
        .collect()
}
