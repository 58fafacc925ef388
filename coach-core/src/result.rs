//! Optimizer output handed to the plan narrator and presentation layer.

use crate::objective::PenaltyBreakdown;
use crate::solver::SolverKind;
use serde::{Deserialize, Serialize};

/// Real-world totals of the winning selection (not the penalized score).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveMetrics {
    pub effort_used: i64,
    pub cash_used: f64,
    pub projected_balance: f64,
    pub buffer_respected: bool,
    pub effort_within_budget: bool,
    pub cash_within_budget: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Solver that ran alongside greedy (exact or stochastic). None for an empty catalog.
    pub primary_solver: Option<SolverKind>,
    pub primary_score: f64,
    pub greedy_score: f64,
    /// True only when the exact solver produced the returned selection.
    pub optimal_guaranteed: bool,
    pub evaluations: u64,
    pub penalties: PenaltyBreakdown,
    pub conflict_pairs_selected: usize,
    pub missing_required_ids: Vec<String>,
    pub notes: Vec<String>,
}

/// Higher score is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Selected ids in catalog order.
    pub selected_ids: Vec<String>,
    pub score: f64,
    pub solver_used: SolverKind,
    pub metrics: SolveMetrics,
    pub diagnostics: Diagnostics,
}

impl SolverResult {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }
}
