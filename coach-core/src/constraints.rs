//! Per-call budgets and the financial snapshot they are checked against.

use serde::{Deserialize, Serialize};

/// Weekly budgets for one optimization call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    pub max_effort_minutes: i32,
    pub max_upfront_cash: f64,
    /// Checking balance that must remain after selected cash-flow deltas.
    pub min_balance_after: f64,
}

impl Constraints {
    pub fn new(max_effort_minutes: i32, max_upfront_cash: f64, min_balance_after: f64) -> Self {
        Self {
            max_effort_minutes,
            max_upfront_cash,
            min_balance_after,
        }
    }
}

/// Financial state supplied by the snapshot builder.
///
/// Only `starting_balance` feeds the objective; the monthly estimates and
/// risk flags are carried through for reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSnapshot {
    pub starting_balance: f64,
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default)]
    pub monthly_spend: f64,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

impl FinancialSnapshot {
    pub fn with_balance(starting_balance: f64) -> Self {
        Self {
            starting_balance,
            ..Self::default()
        }
    }

    /// Income minus spend per month. Negative means the user is running a deficit.
    pub fn net_monthly_margin(&self) -> f64 {
        self.monthly_income - self.monthly_spend
    }
}
