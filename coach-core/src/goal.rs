//! Coaching goals and the benefit-weighting profile each one fixes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// The user's current financial goal. Closed set: every weight table below
/// is matched exhaustively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    StabilizeCashflow,
    PayDownDebt,
    BuildEmergencyFund,
}

/// Multipliers applied to the three benefit components of an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProfile {
    /// Weight on the action's own per-goal affinity.
    pub affinity: f64,
    /// Weight on normalized monthly cash-flow delta.
    pub cash: f64,
    /// Weight on normalized risk reduction.
    pub risk: f64,
}

impl Goal {
    pub const ALL: [Goal; 3] = [
        Goal::StabilizeCashflow,
        Goal::PayDownDebt,
        Goal::BuildEmergencyFund,
    ];

    /// Fixed benefit weights for this goal.
    pub fn profile(&self) -> GoalProfile {
        match self {
            Goal::StabilizeCashflow => GoalProfile {
                affinity: 0.4,
                cash: 0.5,
                risk: 0.1,
            },
            Goal::PayDownDebt => GoalProfile {
                affinity: 0.6,
                cash: 0.1,
                risk: 0.3,
            },
            Goal::BuildEmergencyFund => GoalProfile {
                affinity: 0.4,
                cash: 0.3,
                risk: 0.3,
            },
        }
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Goal::StabilizeCashflow => "stabilize_cashflow",
            Goal::PayDownDebt => "pay_down_debt",
            Goal::BuildEmergencyFund => "build_emergency_fund",
        }
    }

    /// Boilerplate sentence used by the explainability report.
    pub fn rationale(&self) -> &'static str {
        match self {
            Goal::StabilizeCashflow => {
                "Goal is to stabilize cash flow, so actions that free up monthly cash rank highest."
            }
            Goal::PayDownDebt => {
                "Goal is to pay down debt, so debt-focused actions rank highest \
                 even when they cost cash this month."
            }
            Goal::BuildEmergencyFund => {
                "Goal is to build an emergency fund, so cash savings and risk \
                 reduction are weighted evenly."
            }
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Goal::StabilizeCashflow => "Stabilize cash flow",
            Goal::PayDownDebt => "Pay down debt",
            Goal::BuildEmergencyFund => "Build emergency fund",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown goal: {0} (expected stabilize_cashflow, pay_down_debt or build_emergency_fund)")]
pub struct GoalParseError(pub String);

impl FromStr for Goal {
    type Err = GoalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "stabilize_cashflow" | "stabilize_cash_flow" | "stabilize" => {
                Ok(Goal::StabilizeCashflow)
            }
            "pay_down_debt" | "debt" => Ok(Goal::PayDownDebt),
            "build_emergency_fund" | "emergency_fund" => Ok(Goal::BuildEmergencyFund),
            _ => Err(GoalParseError(s.to_string())),
        }
    }
}
