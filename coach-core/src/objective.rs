//! Objective evaluator (higher is better).
//!
//! ```text
//! score = Σ value[i]·x[i]
//!       + synergy_bonus    · #selected synergy pairs
//!       − conflict_penalty · #selected conflict pairs
//!       − required_penalty · #required ids left unselected
//!       − λ_effort · max(0, effort_used  − max_effort)²
//!       − λ_cash   · max(0, upfront_used − max_upfront)²
//!       − λ_buffer · max(0, min_balance  − projected_balance)²
//! ```
//!
//! Selection status of ineligible actions is not scored here; solvers never
//! turn them on.

use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::problem::Problem;
use serde::{Deserialize, Serialize};

const CONFLICT_CALIBRATION: f64 = 10.0;
const REQUIRED_CALIBRATION: f64 = 5.0;
const MAX_PENALTY_WEIGHT: f64 = f64::MAX / 16.0;

/// Penalty constants after per-catalog calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyWeights {
    pub synergy_bonus: f64,
    pub conflict: f64,
    pub required: f64,
    pub effort: f64,
    pub cash: f64,
    pub buffer: f64,
}

impl PenaltyWeights {
    /// Raise the conflict and required constants above the largest swing in
    /// benefit plus budget penalties any assignment of this catalog can produce.
    pub fn calibrate(problem: &Problem<'_>, config: &SolverConfig) -> Self {
        let max_benefit = problem.values().iter().map(|v| v.abs()).sum::<f64>()
            + config.synergy_bonus * problem.synergy_pairs().len() as f64
            + 1.0;
        let swing = max_benefit + worst_budget_penalty(problem, config);
        // Huge budgets or costs can push the swing to inf; an infinite weight
        // times a zero count is NaN and would poison every score.
        let calibrated = |floor: f64, k: f64| floor.max(k * swing).min(MAX_PENALTY_WEIGHT);
        Self {
            synergy_bonus: config.synergy_bonus,
            conflict: calibrated(config.conflict_penalty, CONFLICT_CALIBRATION),
            required: calibrated(config.required_penalty, REQUIRED_CALIBRATION),
            effort: config.effort_penalty,
            cash: config.cash_penalty,
            buffer: config.buffer_penalty,
        }
    }
}

/// Budget penalties with every action selected and every drain applied.
fn worst_budget_penalty(problem: &Problem<'_>, config: &SolverConfig) -> f64 {
    let c = problem.constraints();
    let actions = problem.actions();

    let effort: i64 = actions.iter().map(|a| i64::from(a.effort_minutes)).sum();
    let upfront: f64 = actions.iter().map(|a| a.upfront_cash_cost).sum();
    let drained: f64 = actions.iter().map(|a| a.monthly_cashflow_delta.min(0.0)).sum();

    let effort_excess = (effort - i64::from(c.max_effort_minutes)).max(0) as f64;
    let cash_excess = (upfront - c.max_upfront_cash).max(0.0);
    let shortfall = (c.min_balance_after - (problem.starting_balance() + drained)).max(0.0);

    config.effort_penalty * effort_excess * effort_excess
        + config.cash_penalty * cash_excess * cash_excess
        + config.buffer_penalty * shortfall * shortfall
}

/// Running totals for one assignment. Everything the score depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub linear: f64,
    pub effort: i64,
    pub upfront: f64,
    pub cashflow: f64,
    pub synergy_pairs: usize,
    pub conflict_pairs: usize,
    pub missing_required: usize,
}

/// The individual terms subtracted from (or added to) the linear benefit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    pub synergy_bonus: f64,
    pub conflict: f64,
    pub required: f64,
    pub effort: f64,
    pub cash: f64,
    pub buffer: f64,
}

impl PenaltyBreakdown {
    /// Sum of the subtracted terms.
    pub fn total_penalty(&self) -> f64 {
        self.conflict + self.required + self.effort + self.cash + self.buffer
    }
}

#[derive(Debug, Clone)]
pub struct Objective<'p> {
    problem: &'p Problem<'p>,
    weights: PenaltyWeights,
}

impl<'p> Objective<'p> {
    pub fn new(problem: &'p Problem<'p>, config: &SolverConfig) -> Self {
        Self {
            problem,
            weights: PenaltyWeights::calibrate(problem, config),
        }
    }

    pub fn with_weights(problem: &'p Problem<'p>, weights: PenaltyWeights) -> Self {
        Self { problem, weights }
    }

    pub fn problem(&self) -> &'p Problem<'p> {
        self.problem
    }

    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    /// Totals for any selection predicate over catalog indices.
    pub fn tally_with(&self, selected: impl Fn(usize) -> bool) -> Tally {
        let p = self.problem;
        let mut t = Tally::default();
        for i in 0..p.len() {
            if selected(i) {
                let a = &p.actions[i];
                t.linear += p.values[i];
                t.effort += i64::from(a.effort_minutes);
                t.upfront += a.upfront_cash_cost;
                t.cashflow += a.monthly_cashflow_delta;
            } else if p.required[i] {
                t.missing_required += 1;
            }
        }
        t.synergy_pairs = p
            .synergy_pairs
            .iter()
            .filter(|&&(i, j)| selected(i) && selected(j))
            .count();
        t.conflict_pairs = p
            .conflict_pairs
            .iter()
            .filter(|&&(i, j)| selected(i) && selected(j))
            .count();
        t
    }

    pub fn tally(&self, assignment: &Assignment) -> Tally {
        self.tally_with(|i| assignment.get(i))
    }

    pub fn tally_mask(&self, mask: u32) -> Tally {
        self.tally_with(|i| (mask >> i) & 1 == 1)
    }

    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.score(&self.tally(assignment))
    }

    pub fn evaluate_mask(&self, mask: u32) -> f64 {
        self.score(&self.tally_mask(mask))
    }

    pub fn projected_balance(&self, tally: &Tally) -> f64 {
        self.problem.starting_balance() + tally.cashflow
    }

    pub fn penalties(&self, tally: &Tally) -> PenaltyBreakdown {
        let c = &self.problem.constraints;
        let w = &self.weights;

        let effort_excess = (tally.effort - i64::from(c.max_effort_minutes)).max(0) as f64;
        let cash_excess = (tally.upfront - c.max_upfront_cash).max(0.0);
        let buffer_shortfall = (c.min_balance_after - self.projected_balance(tally)).max(0.0);

        PenaltyBreakdown {
            synergy_bonus: w.synergy_bonus * tally.synergy_pairs as f64,
            conflict: w.conflict * tally.conflict_pairs as f64,
            required: w.required * tally.missing_required as f64,
            effort: w.effort * effort_excess * effort_excess,
            cash: w.cash * cash_excess * cash_excess,
            buffer: w.buffer * buffer_shortfall * buffer_shortfall,
        }
    }

    pub fn score(&self, tally: &Tally) -> f64 {
        let pen = self.penalties(tally);
        tally.linear + pen.synergy_bonus - pen.total_penalty()
    }

    /// Totals after flipping bit `i` of the assignment described by `current`.
    pub fn flipped(&self, current: &Tally, assignment: &Assignment, i: usize) -> Tally {
        let p = self.problem;
        let a = &p.actions[i];
        let sign: i64 = if assignment.get(i) { -1 } else { 1 };
        let fsign = sign as f64;

        let active_conflicts = p.conflicts[i].iter().filter(|&&j| assignment.get(j)).count();
        let active_synergies = p.synergies[i].iter().filter(|&&j| assignment.get(j)).count();

        let mut t = *current;
        t.linear += fsign * p.values[i];
        t.effort += sign * i64::from(a.effort_minutes);
        t.upfront += fsign * a.upfront_cash_cost;
        t.cashflow += fsign * a.monthly_cashflow_delta;
        if sign > 0 {
            t.conflict_pairs += active_conflicts;
            t.synergy_pairs += active_synergies;
            if p.required[i] {
                t.missing_required -= 1;
            }
        } else {
            t.conflict_pairs -= active_conflicts;
            t.synergy_pairs -= active_synergies;
            if p.required[i] {
                t.missing_required += 1;
            }
        }
        t
    }
}

/// An assignment plus its running totals, scored incrementally.
#[derive(Debug, Clone)]
pub struct ObjectiveState<'o, 'p> {
    objective: &'o Objective<'p>,
    assignment: Assignment,
    tally: Tally,
    score: f64,
}

impl<'o, 'p> ObjectiveState<'o, 'p> {
    pub fn new(objective: &'o Objective<'p>, assignment: Assignment) -> Self {
        let tally = objective.tally(&assignment);
        let score = objective.score(&tally);
        Self {
            objective,
            assignment,
            tally,
            score,
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn into_assignment(self) -> Assignment {
        self.assignment
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Score change if bit `i` were flipped, without flipping it.
    pub fn flip_delta(&self, i: usize) -> f64 {
        let next = self.objective.flipped(&self.tally, &self.assignment, i);
        self.objective.score(&next) - self.score
    }

    pub fn apply_flip(&mut self, i: usize) {
        self.tally = self.objective.flipped(&self.tally, &self.assignment, i);
        self.assignment.flip(i);
        self.score = self.objective.score(&self.tally);
    }
}
