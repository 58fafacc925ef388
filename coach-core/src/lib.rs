//! coach-core: goal-conditioned action-selection optimizer for the coaching app.
//!
//! Given a catalog of remediation actions, a goal and weekly budgets, pick the
//! subset that maximizes a goal-weighted score. Small catalogs are solved
//! exactly, larger ones by simulated annealing, and a greedy baseline always
//! runs alongside; the best score wins.

pub mod action;
pub mod assignment;
pub mod config;
pub mod constraints;
pub mod error;
pub mod explain;
pub mod goal;
pub mod objective;
pub mod optimizer;
pub mod problem;
pub mod result;
pub mod solver;
pub mod value;

pub use action::{ActionRecord, GoalWeights};
pub use assignment::Assignment;
pub use config::{MAX_EXACT_ACTIONS, SolverConfig};
pub use constraints::{Constraints, FinancialSnapshot};
pub use error::OptimizeError;
pub use explain::{ActionContribution, Explanation, explain};
pub use goal::{Goal, GoalParseError, GoalProfile};
pub use objective::{Objective, ObjectiveState, PenaltyBreakdown, PenaltyWeights, Tally};
pub use optimizer::{Optimizer, optimize};
pub use problem::{OptimizeRequest, Problem};
pub use result::{Diagnostics, SolveMetrics, SolverResult};
pub use solver::{AnnealParams, Candidate, SolverKind, solve_anneal, solve_exact, solve_greedy};
pub use value::{Normalizer, ValueBreakdown, value, value_breakdown, value_vector};
