//! Combinatorial solvers over the shared objective.
//!
//! - `exact`: full bitmask enumeration, globally optimal, small catalogs only.
//! - `anneal`: single-bit-flip simulated annealing, no optimality guarantee.
//! - `greedy`: value-per-minute heuristic, always run as a backstop.

pub mod anneal;
pub mod exact;
pub mod greedy;

pub use anneal::{AnnealParams, solve_anneal};
pub use exact::solve_exact;
pub use greedy::solve_greedy;

use crate::assignment::Assignment;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    Exact,
    Stochastic,
    Greedy,
}

impl SolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Exact => "exact",
            SolverKind::Stochastic => "stochastic",
            SolverKind::Greedy => "greedy",
        }
    }

    /// Only exhaustive enumeration proves optimality.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolverKind::Exact)
    }
}

impl Display for SolverKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One solver's best assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub solver: SolverKind,
    pub assignment: Assignment,
    pub score: f64,
    /// Number of objective evaluations (full or incremental) performed.
    pub evaluations: u64,
}
