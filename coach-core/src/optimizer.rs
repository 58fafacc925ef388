//! Solver arbiter: run exact or stochastic by catalog size, always run
//! greedy, return the higher score.
//!
//! Stateless: every call builds its own problem, values and buffers.

use crate::action::ActionRecord;
use crate::assignment::Assignment;
use crate::config::SolverConfig;
use crate::constraints::{Constraints, FinancialSnapshot};
use crate::error::Result;
use crate::explain::{Explanation, explain};
use crate::goal::Goal;
use crate::objective::{Objective, PenaltyBreakdown, Tally};
use crate::problem::{OptimizeRequest, Problem};
use crate::result::{Diagnostics, SolveMetrics, SolverResult};
use crate::solver::{AnnealParams, Candidate, SolverKind, solve_anneal, solve_exact, solve_greedy};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: SolverConfig,
}

impl Optimizer {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Validate, then solve.
    pub fn solve(&self, request: &OptimizeRequest) -> Result<SolverResult> {
        let problem = Problem::build(request, &self.config)?;
        Ok(self.solve_problem(&problem))
    }

    /// Solve and decorate the result with the explainability report.
    pub fn solve_explained(
        &self,
        request: &OptimizeRequest,
    ) -> Result<(SolverResult, Explanation)> {
        let problem = Problem::build(request, &self.config)?;
        let result = self.solve_problem(&problem);
        let explanation = explain(&problem, &result);
        Ok((result, explanation))
    }

    pub fn solve_problem(&self, problem: &Problem<'_>) -> SolverResult {
        if problem.is_empty() {
            tracing::debug!("empty catalog; nothing to optimize");
            // All metrics zero, including the projected balance.
            return SolverResult {
                selected_ids: Vec::new(),
                score: 0.0,
                solver_used: SolverKind::Greedy,
                metrics: SolveMetrics::default(),
                diagnostics: Diagnostics::default(),
            };
        }

        let objective = Objective::new(problem, &self.config);
        let primary = self.run_primary(&objective);
        let greedy = solve_greedy(&objective);

        let primary_solver = primary.solver;
        let primary_score = primary.score;
        let greedy_score = greedy.score;
        let evaluations = primary.evaluations + greedy.evaluations;

        // Ties go to the primary solver.
        let winner = if greedy_score > primary_score {
            greedy
        } else {
            primary
        };

        tracing::info!(
            n = problem.len(),
            primary = %primary_solver,
            primary_score,
            greedy_score,
            winner = %winner.solver,
            "arbitration finished"
        );

        self.build_result(
            &objective,
            winner,
            primary_solver,
            primary_score,
            greedy_score,
            evaluations,
        )
    }

    fn run_primary(&self, objective: &Objective<'_>) -> Candidate {
        let n = objective.problem().len();
        if n <= self.config.exact_limit() {
            match solve_exact(objective) {
                Ok(candidate) => return candidate,
                Err(err) => {
                    tracing::warn!(%err, "exact solver unavailable; falling back to annealing")
                }
            }
        }

        tracing::warn!(
            n,
            iterations = self.config.anneal_iterations,
            seed = self.config.seed,
            "catalog above exact cutoff; stochastic search has no optimality guarantee"
        );
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        solve_anneal(objective, &AnnealParams::from_config(&self.config), &mut rng)
    }

    fn build_result(
        &self,
        objective: &Objective<'_>,
        winner: Candidate,
        primary_solver: SolverKind,
        primary_score: f64,
        greedy_score: f64,
        evaluations: u64,
    ) -> SolverResult {
        let problem = objective.problem();
        let tally = objective.tally(&winner.assignment);
        let penalties = objective.penalties(&tally);

        let selected_ids = ids_of(problem, &winner.assignment);
        let missing_required_ids = problem
            .required_indices()
            .filter(|&i| !winner.assignment.get(i))
            .map(|i| problem.actions()[i].id.clone())
            .collect();

        SolverResult {
            selected_ids,
            score: winner.score,
            solver_used: winner.solver,
            metrics: metrics_for(problem, &tally),
            diagnostics: Diagnostics {
                primary_solver: Some(primary_solver),
                primary_score,
                greedy_score,
                optimal_guaranteed: winner.solver.is_optimal(),
                evaluations,
                conflict_pairs_selected: tally.conflict_pairs,
                missing_required_ids,
                notes: notes_for(winner.solver, primary_solver, &penalties),
                penalties,
            },
        }
    }
}

/// Convenience entry point with default tuning.
pub fn optimize(
    actions: &[ActionRecord],
    goal: Goal,
    constraints: Constraints,
    required_action_ids: &[String],
    starting_balance: f64,
) -> Result<SolverResult> {
    let request = OptimizeRequest {
        actions: actions.to_vec(),
        goal,
        constraints,
        required_action_ids: required_action_ids.to_vec(),
        snapshot: FinancialSnapshot::with_balance(starting_balance),
    };
    Optimizer::default().solve(&request)
}

fn ids_of(problem: &Problem<'_>, assignment: &Assignment) -> Vec<String> {
    assignment
        .selected()
        .map(|i| problem.actions()[i].id.clone())
        .collect()
}

fn metrics_for(problem: &Problem<'_>, tally: &Tally) -> SolveMetrics {
    let c = problem.constraints();
    let projected_balance = problem.starting_balance() + tally.cashflow;
    SolveMetrics {
        effort_used: tally.effort,
        cash_used: tally.upfront,
        projected_balance,
        buffer_respected: projected_balance >= c.min_balance_after,
        effort_within_budget: tally.effort <= i64::from(c.max_effort_minutes),
        cash_within_budget: tally.upfront <= c.max_upfront_cash,
    }
}

fn notes_for(winner: SolverKind, primary: SolverKind, penalties: &PenaltyBreakdown) -> Vec<String> {
    let mut notes = Vec::new();
    match winner {
        SolverKind::Exact => {
            notes.push("exact enumeration: selection is globally optimal".to_string())
        }
        SolverKind::Stochastic => notes.push(
            "simulated annealing: heuristic result, no optimality guarantee".to_string(),
        ),
        SolverKind::Greedy => notes.push(format!(
            "greedy heuristic beat the {primary} solver; no optimality guarantee"
        )),
    }
    if penalties.required > 0.0 {
        notes.push("some required actions could not be selected".to_string());
    }
    if penalties.conflict > 0.0 {
        notes.push("selection contains a conflicting pair".to_string());
    }
    if penalties.effort + penalties.cash + penalties.buffer > 0.0 {
        notes.push("selection exceeds a budget; quadratic penalties applied".to_string());
    }
    notes
}
