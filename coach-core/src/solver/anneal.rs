//! Simulated annealing over single-bit flips.
//!
//! Heuristic only: the returned assignment is the best one visited, with no
//! optimality guarantee. The random source is injected so runs are
//! reproducible per seed.

use super::{Candidate, SolverKind};
use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::objective::{Objective, ObjectiveState};
use rand::Rng;

const MIN_TEMPERATURE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealParams {
    pub iterations: u32,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
}

impl AnnealParams {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            iterations: config.anneal_iterations,
            initial_temperature: config.initial_temperature,
            cooling_rate: config.cooling_rate,
        }
    }
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

/// Start from all-zero with required actions forced on; only eligible,
/// non-required bits are ever flipped.
pub fn solve_anneal<R: Rng>(
    objective: &Objective<'_>,
    params: &AnnealParams,
    rng: &mut R,
) -> Candidate {
    let problem = objective.problem();
    let n = problem.len();
    let start = Assignment::from_indices(n, problem.required_indices());
    let mut state = ObjectiveState::new(objective, start);

    let mut best = state.assignment().clone();
    let mut best_score = state.score();
    let mut evaluations = 1u64;
    let mut accepted = 0u64;

    let free = problem.free_indices();
    if free.is_empty() {
        tracing::debug!(n, "anneal: nothing to flip");
        return Candidate {
            solver: SolverKind::Stochastic,
            assignment: best,
            score: best_score,
            evaluations,
        };
    }

    let start_temperature = start_temperature(problem.values(), &free, params.initial_temperature);
    let mut temperature = start_temperature;
    for _ in 0..params.iterations {
        let i = free[rng.gen_range(0..free.len())];
        let delta = state.flip_delta(i);
        evaluations += 1;

        // delta is the score gain; a worsening move has delta < 0.
        let accept = delta >= 0.0 || {
            let p = (delta / temperature.max(MIN_TEMPERATURE)).exp();
            rng.gen_range(0.0..1.0) < p
        };

        if accept {
            state.apply_flip(i);
            accepted += 1;
            if state.score() > best_score {
                best_score = state.score();
                best = state.assignment().clone();
            }
        }

        temperature *= params.cooling_rate;
    }

    // Re-score from scratch so incremental drift never leaks into the result.
    let score = objective.evaluate(&best);

    tracing::debug!(
        n,
        iterations = params.iterations,
        accepted,
        score,
        start_temperature,
        final_temperature = temperature,
        "anneal solve finished"
    );

    Candidate {
        solver: SolverKind::Stochastic,
        assignment: best,
        score,
        evaluations,
    }
}

/// `multiplier` times the largest |value| among `free`, so early moves can
/// drop any single action regardless of the catalog's point scale.
fn start_temperature(values: &[f64], free: &[usize], multiplier: f64) -> f64 {
    let largest = free.iter().map(|&i| values[i].abs()).fold(0.0_f64, f64::max);
    let base = if largest > 0.0 { largest } else { 1.0 };
    (multiplier * base).max(MIN_TEMPERATURE)
}
