//! Greedy solver: value-per-minute order, no backtracking.
//!
//! Deterministic and O(n log n) plus adjacency scans. Runs on every solve as a
//! baseline the primary solver has to beat.

use super::{Candidate, SolverKind};
use crate::assignment::Assignment;
use crate::objective::{Objective, ObjectiveState};
use std::cmp::Ordering;

pub fn solve_greedy(objective: &Objective<'_>) -> Candidate {
    let problem = objective.problem();
    let n = problem.len();
    let c = problem.constraints();
    let values = problem.values();

    let start = Assignment::from_indices(n, problem.required_indices());
    let mut state = ObjectiveState::new(objective, start);
    let mut evaluations = 1u64;

    let mut order = problem.free_indices();
    // Stable sort: equal ratios keep catalog order.
    order.sort_by(|&a, &b| {
        ratio(values[b], effort_of(problem, b))
            .partial_cmp(&ratio(values[a], effort_of(problem, a)))
            .unwrap_or(Ordering::Equal)
    });

    for i in order {
        if problem.conflicts_of(i).iter().any(|&j| state.assignment().get(j)) {
            continue;
        }

        let action = &problem.actions()[i];
        let t = state.tally();
        if t.effort + i64::from(action.effort_minutes) > i64::from(c.max_effort_minutes) {
            continue;
        }
        if t.upfront + action.upfront_cash_cost > c.max_upfront_cash {
            continue;
        }
        // Only a cash-draining action can break the buffer.
        let balance = objective.projected_balance(t) + action.monthly_cashflow_delta;
        if action.monthly_cashflow_delta < 0.0 && balance < c.min_balance_after {
            continue;
        }

        evaluations += 1;
        if state.flip_delta(i) <= 0.0 {
            continue;
        }
        state.apply_flip(i);
    }

    let assignment = state.into_assignment();
    let score = objective.evaluate(&assignment);

    tracing::debug!(
        n,
        selected = assignment.count_selected(),
        score,
        "greedy solve finished"
    );

    Candidate {
        solver: SolverKind::Greedy,
        assignment,
        score,
        evaluations,
    }
}

fn effort_of(problem: &crate::problem::Problem<'_>, i: usize) -> i32 {
    problem.actions()[i].effort_minutes
}

fn ratio(value: f64, effort_minutes: i32) -> f64 {
    value / f64::from(effort_minutes.max(1))
}
