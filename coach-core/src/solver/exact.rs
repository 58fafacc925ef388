//! Exact solver: enumerate every bitmask 0..2ⁿ and keep the best.
//!
//! Masks missing a required action or selecting an ineligible one are
//! rejected without scoring. Ties keep the lowest mask, so the result is
//! reproducible bit for bit.

use super::{Candidate, SolverKind};
use crate::assignment::Assignment;
use crate::config::MAX_EXACT_ACTIONS;
use crate::error::{OptimizeError, Result};
use crate::objective::Objective;

pub fn solve_exact(objective: &Objective<'_>) -> Result<Candidate> {
    let problem = objective.problem();
    let n = problem.len();
    if n > MAX_EXACT_ACTIONS {
        return Err(OptimizeError::CatalogTooLarge {
            size: n,
            max: MAX_EXACT_ACTIONS,
        });
    }

    let required_mask = mask_of(n, |i| problem.is_required(i));
    let ineligible_mask = mask_of(n, |i| !problem.is_eligible(i));

    let mut best: Option<(u32, f64)> = None;
    let mut evaluations = 0u64;
    let mut rejected = 0u64;

    let end: u32 = 1 << n;
    for mask in 0..end {
        if mask & required_mask != required_mask || mask & ineligible_mask != 0 {
            rejected += 1;
            continue;
        }

        let score = objective.evaluate_mask(mask);
        evaluations += 1;
        // Strict comparison: an equal score never replaces a lower mask.
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((mask, score));
        }
    }

    // Validation guarantees the all-required mask survives the filter.
    let (mask, score) =
        best.unwrap_or_else(|| (required_mask, objective.evaluate_mask(required_mask)));

    tracing::debug!(n, evaluations, rejected, score, mask, "exact solve finished");

    Ok(Candidate {
        solver: SolverKind::Exact,
        assignment: Assignment::from_mask(mask, n),
        score,
        evaluations,
    })
}

fn mask_of(n: usize, pred: impl Fn(usize) -> bool) -> u32 {
    (0..n).filter(|&i| pred(i)).fold(0u32, |m, i| m | (1 << i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionRecord;
    use crate::config::SolverConfig;
    use crate::constraints::Constraints;
    use crate::goal::Goal;
    use crate::problem::{OptimizeRequest, Problem};

    fn ids(problem: &Problem<'_>, a: &Assignment) -> Vec<String> {
        a.selected().map(|i| problem.actions()[i].id.clone()).collect()
    }

    #[test]
    fn test_picks_higher_value_of_conflicting_pair() {
        let req = OptimizeRequest::new(
            vec![
                ActionRecord::new("a", "A").with_effort(15).with_cashflow(30.0).with_risk(2.0),
                ActionRecord::new("b", "B")
                    .with_effort(30)
                    .with_cashflow(50.0)
                    .with_risk(1.0)
                    .with_conflict("a"),
            ],
            Goal::StabilizeCashflow,
            Constraints::new(120, 0.0, 100.0),
            500.0,
        );
        let cfg = SolverConfig::default();
        let p = Problem::build(&req, &cfg).unwrap();
        let obj = Objective::new(&p, &cfg);

        let c = solve_exact(&obj).unwrap();
        assert_eq!(ids(&p, &c.assignment), vec!["b"]);
        assert_eq!(c.solver, SolverKind::Exact);
        assert_eq!(c.evaluations, 4);
    }

    #[test]
    fn test_ties_resolve_to_lowest_mask() {
        let twin = |id: &str| ActionRecord::new(id, id).with_effort(10).with_cashflow(20.0);
        let req = OptimizeRequest::new(
            vec![twin("x"), twin("y").with_conflict("x")],
            Goal::BuildEmergencyFund,
            Constraints::new(60, 0.0, 0.0),
            100.0,
        );
        let cfg = SolverConfig::default();
        let p = Problem::build(&req, &cfg).unwrap();
        let obj = Objective::new(&p, &cfg);

        for _ in 0..3 {
            let c = solve_exact(&obj).unwrap();
            assert_eq!(ids(&p, &c.assignment), vec!["x"]);
        }
    }

    #[test]
    fn test_required_hard_filter_and_ineligible_exclusion() {
        let req = OptimizeRequest::new(
            vec![
                ActionRecord::new("a", "A").with_cashflow(80.0).with_risk(5.0),
                ActionRecord::new("b", "B").with_cashflow(10.0).with_conflict("a"),
                ActionRecord::new("c", "C").with_cashflow(100.0).ineligible(),
            ],
            Goal::StabilizeCashflow,
            Constraints::new(120, 0.0, 0.0),
            0.0,
        )
        .with_required("b");
        let cfg = SolverConfig::default();
        let p = Problem::build(&req, &cfg).unwrap();
        let obj = Objective::new(&p, &cfg);

        let c = solve_exact(&obj).unwrap();
        assert_eq!(ids(&p, &c.assignment), vec!["b"]);
        // Only masks {b} and {a, b} survive the filter.
        assert_eq!(c.evaluations, 2);
    }

    #[test]
    fn test_empty_catalog_scores_zero() {
        let req =
            OptimizeRequest::new(vec![], Goal::PayDownDebt, Constraints::new(0, 0.0, 0.0), 0.0);
        let cfg = SolverConfig::default();
        let p = Problem::build(&req, &cfg).unwrap();
        let obj = Objective::new(&p, &cfg);
        let c = solve_exact(&obj).unwrap();
        assert_eq!(c.score, 0.0);
        assert!(c.assignment.is_empty());
    }
}
