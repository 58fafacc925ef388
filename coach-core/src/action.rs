//! Action catalog records: one candidate remediation step each.

use crate::goal::Goal;
use serde::{Deserialize, Serialize};

/// Relative benefit of an action for each goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalWeights {
    pub stabilize_cashflow: f64,
    pub pay_down_debt: f64,
    pub build_emergency_fund: f64,
}

impl Default for GoalWeights {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl GoalWeights {
    pub fn new(stabilize_cashflow: f64, pay_down_debt: f64, build_emergency_fund: f64) -> Self {
        Self {
            stabilize_cashflow,
            pay_down_debt,
            build_emergency_fund,
        }
    }

    pub fn uniform(weight: f64) -> Self {
        Self::new(weight, weight, weight)
    }

    pub fn for_goal(&self, goal: Goal) -> f64 {
        match goal {
            Goal::StabilizeCashflow => self.stabilize_cashflow,
            Goal::PayDownDebt => self.pay_down_debt,
            Goal::BuildEmergencyFund => self.build_emergency_fund,
        }
    }

    pub(crate) fn values(&self) -> [(&'static str, f64); 3] {
        [
            ("goal_weights.stabilize_cashflow", self.stabilize_cashflow),
            ("goal_weights.pay_down_debt", self.pay_down_debt),
            ("goal_weights.build_emergency_fund", self.build_emergency_fund),
        ]
    }
}

/// A discrete, optional action the optimizer may select.
///
/// Records are supplied by the snapshot builder and never mutated while a
/// solve is running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub id: String,

    /// Short label for reports. Falls back to `id` when empty.
    #[serde(default)]
    pub title: String,

    /// Minutes charged against the weekly effort budget.
    pub effort_minutes: i32,

    /// One-time cost charged against the upfront-cash budget.
    #[serde(default)]
    pub upfront_cash_cost: f64,

    /// Signed change in free cash per month (negative for e.g. extra debt payments).
    #[serde(default)]
    pub monthly_cashflow_delta: f64,

    /// 0-10 coarse risk mitigation estimate.
    #[serde(default)]
    pub risk_reduction_score: f64,

    #[serde(default)]
    pub goal_weights: GoalWeights,

    #[serde(default)]
    pub conflicts_with: Vec<String>,

    #[serde(default)]
    pub synergy_with: Vec<String>,

    /// Precomputed by the snapshot builder. Ineligible actions are never selected.
    #[serde(default = "default_eligible")]
    pub eligible: bool,
}

fn default_eligible() -> bool {
    true
}

impl ActionRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            effort_minutes: 0,
            upfront_cash_cost: 0.0,
            monthly_cashflow_delta: 0.0,
            risk_reduction_score: 0.0,
            goal_weights: GoalWeights::default(),
            conflicts_with: Vec::new(),
            synergy_with: Vec::new(),
            eligible: true,
        }
    }

    pub fn with_effort(mut self, minutes: i32) -> Self {
        self.effort_minutes = minutes;
        self
    }

    pub fn with_upfront_cost(mut self, cost: f64) -> Self {
        self.upfront_cash_cost = cost;
        self
    }

    pub fn with_cashflow(mut self, monthly_delta: f64) -> Self {
        self.monthly_cashflow_delta = monthly_delta;
        self
    }

    pub fn with_risk(mut self, score: f64) -> Self {
        self.risk_reduction_score = score;
        self
    }

    pub fn with_goal_weights(mut self, weights: GoalWeights) -> Self {
        self.goal_weights = weights;
        self
    }

    pub fn with_conflict(mut self, other: impl Into<String>) -> Self {
        self.conflicts_with.push(other.into());
        self
    }

    pub fn with_synergy(mut self, other: impl Into<String>) -> Self {
        self.synergy_with.push(other.into());
        self
    }

    pub fn ineligible(mut self) -> Self {
        self.eligible = false;
        self
    }

    pub fn display_name(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}
