use coach_core::{
    ActionRecord, AnnealParams, Constraints, FinancialSnapshot, Goal, GoalWeights, Objective,
    OptimizeRequest, Optimizer, Problem, SolverConfig, SolverKind, optimize, solve_anneal,
    solve_exact, solve_greedy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random catalog with integer-valued attributes, a few conflicts/synergies,
/// some ineligible actions and at most one required id.
fn random_request(seed: u64, n: usize) -> OptimizeRequest {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut actions = Vec::with_capacity(n);

    for i in 0..n {
        let mut a = ActionRecord::new(format!("act-{i}"), format!("Action {i}"))
            .with_effort(rng.gen_range(0..60))
            .with_upfront_cost(if rng.gen_range(0..3) == 0 {
                f64::from(rng.gen_range(1..40i32))
            } else {
                0.0
            })
            .with_cashflow(f64::from(rng.gen_range(-120..120i32)))
            .with_risk(f64::from(rng.gen_range(0..=10i32)))
            .with_goal_weights(GoalWeights::new(
                f64::from(rng.gen_range(0..20i32)) / 10.0,
                f64::from(rng.gen_range(0..20i32)) / 10.0,
                f64::from(rng.gen_range(0..20i32)) / 10.0,
            ));
        for j in 0..i {
            if rng.gen_range(0..100) < 15 {
                a = a.with_conflict(format!("act-{j}"));
            } else if rng.gen_range(0..100) < 10 {
                a = a.with_synergy(format!("act-{j}"));
            }
        }
        if rng.gen_range(0..10) == 0 {
            a = a.ineligible();
        }
        actions.push(a);
    }

    let goal = Goal::ALL[rng.gen_range(0..3)];
    let constraints = Constraints::new(
        rng.gen_range(30..150),
        f64::from(rng.gen_range(0..60i32)),
        f64::from(rng.gen_range(0..400i32)),
    );
    let balance = f64::from(rng.gen_range(200..800i32));
    let mut req = OptimizeRequest::new(actions, goal, constraints, balance);

    if rng.gen_range(0..2) == 0 {
        if let Some(a) = req.actions.iter().find(|a| a.eligible) {
            let id = a.id.clone();
            req.required_action_ids.push(id);
        }
    }
    req
}

/// Masks that keep every required action and select no ineligible one.
fn admissible_masks(problem: &Problem<'_>) -> Vec<u32> {
    let n = problem.len();
    (0u32..(1 << n))
        .filter(|&mask| {
            (0..n).all(|i| {
                let on = (mask >> i) & 1 == 1;
                (!problem.is_required(i) || on) && (problem.is_eligible(i) || !on)
            })
        })
        .collect()
}

fn has_conflict(problem: &Problem<'_>, selected: impl Fn(usize) -> bool) -> bool {
    problem
        .conflict_pairs()
        .iter()
        .any(|&(i, j)| selected(i) && selected(j))
}

fn within_budgets(problem: &Problem<'_>, selected: impl Fn(usize) -> bool) -> bool {
    let c = problem.constraints();
    let (mut effort, mut cash, mut flow) = (0i64, 0.0, 0.0);
    for (i, a) in problem.actions().iter().enumerate() {
        if selected(i) {
            effort += i64::from(a.effort_minutes);
            cash += a.upfront_cash_cost;
            flow += a.monthly_cashflow_delta;
        }
    }
    effort <= i64::from(c.max_effort_minutes)
        && cash <= c.max_upfront_cash
        && problem.starting_balance() + flow >= c.min_balance_after
}

#[test]
fn exact_is_deterministic() {
    for seed in 0..10 {
        let req = random_request(seed, 12);
        let optimizer = Optimizer::default();
        let first = optimizer.solve(&req).unwrap();
        let second = optimizer.solve(&req).unwrap();
        assert_eq!(first, second, "seed {seed}");
    }
}

#[test]
fn exact_matches_brute_force_optimum() {
    let cfg = SolverConfig::default();
    for seed in 0..40 {
        let n = 2 + (seed as usize % 9);
        let req = random_request(seed, n);
        let problem = Problem::build(&req, &cfg).unwrap();
        let objective = Objective::new(&problem, &cfg);

        let exact = solve_exact(&objective).unwrap();
        let best = admissible_masks(&problem)
            .into_iter()
            .map(|m| objective.evaluate_mask(m))
            .fold(f64::NEG_INFINITY, f64::max);

        assert_eq!(exact.score, best, "seed {seed} n {n}");
        assert_eq!(exact.score, objective.evaluate(&exact.assignment));
    }
}

#[test]
fn arbitration_never_regresses() {
    for seed in 100..130 {
        let n = if seed % 3 == 0 { 28 } else { 10 };
        let req = random_request(seed, n);
        let result = Optimizer::default().solve(&req).unwrap();
        let d = &result.diagnostics;

        assert!(result.score >= d.primary_score, "seed {seed}");
        assert!(result.score >= d.greedy_score, "seed {seed}");
        assert_eq!(result.score, d.primary_score.max(d.greedy_score), "seed {seed}");
        if d.greedy_score > d.primary_score {
            assert_eq!(result.solver_used, SolverKind::Greedy);
        } else {
            assert_eq!(Some(result.solver_used), d.primary_solver);
        }
    }
}

#[test]
fn no_solver_selects_a_conflicting_pair() {
    let cfg = SolverConfig::default();
    for seed in 200..230 {
        let n = if seed % 2 == 0 { 14 } else { 30 };
        let req = random_request(seed, n);
        let problem = Problem::build(&req, &cfg).unwrap();
        let objective = Objective::new(&problem, &cfg);

        let mut candidates = vec![solve_greedy(&objective)];
        candidates.push(solve_anneal(
            &objective,
            &AnnealParams::from_config(&cfg),
            &mut StdRng::seed_from_u64(seed),
        ));
        if n <= 20 {
            candidates.push(solve_exact(&objective).unwrap());
        }

        for c in &candidates {
            assert!(
                !has_conflict(&problem, |i| c.assignment.get(i)),
                "seed {seed} solver {}",
                c.solver
            );
            assert!(
                problem
                    .actions()
                    .iter()
                    .enumerate()
                    .all(|(i, a)| a.eligible || !c.assignment.get(i)),
                "seed {seed} solver {} picked an ineligible action",
                c.solver
            );
        }

        let result = Optimizer::new(cfg.clone()).solve_problem(&problem);
        for (i, a) in problem.actions().iter().enumerate() {
            for j in problem.conflicts_of(i) {
                let other = &problem.actions()[*j].id;
                assert!(!(result.is_selected(&a.id) && result.is_selected(other)));
            }
        }
    }
}

#[test]
fn required_ids_always_included_by_exact() {
    let cfg = SolverConfig::default();
    for seed in 300..330 {
        let mut req = random_request(seed, 10);
        req.required_action_ids.clear();
        // Two non-conflicting eligible actions.
        let picks: Vec<String> = {
            let problem = Problem::build(&req, &cfg).unwrap();
            let eligible: Vec<usize> =
                (0..problem.len()).filter(|&i| problem.is_eligible(i)).collect();
            let mut picks = Vec::new();
            for &i in &eligible {
                if picks.iter().all(|&p: &usize| !problem.conflicts_of(p).contains(&i)) {
                    picks.push(i);
                }
                if picks.len() == 2 {
                    break;
                }
            }
            picks.into_iter().map(|i| problem.actions()[i].id.clone()).collect()
        };
        req.required_action_ids = picks.clone();

        let result = Optimizer::default().solve(&req).unwrap();
        let problem = Problem::build(&req, &cfg).unwrap();
        let exact = solve_exact(&Objective::new(&problem, &cfg)).unwrap();
        for id in &picks {
            let i = problem.actions().iter().position(|a| &a.id == id).unwrap();
            assert!(exact.assignment.get(i), "seed {seed} missing {id}");
            assert!(result.is_selected(id), "seed {seed} missing {id}");
        }
        assert!(result.diagnostics.missing_required_ids.is_empty());
    }
}

#[test]
fn exact_respects_budgets_when_a_feasible_selection_exists() {
    // Penalties large enough that any integer overrun outweighs every benefit.
    let cfg = SolverConfig {
        effort_penalty: 1.0e6,
        cash_penalty: 1.0e6,
        buffer_penalty: 1.0e6,
        ..SolverConfig::default()
    };
    let mut checked = 0;
    for seed in 400..460 {
        let req = random_request(seed, 9);
        let problem = Problem::build(&req, &cfg).unwrap();
        let feasible_exists = admissible_masks(&problem).into_iter().any(|m| {
            let sel = |i: usize| (m >> i) & 1 == 1;
            within_budgets(&problem, sel) && !has_conflict(&problem, sel)
        });
        if !feasible_exists {
            continue;
        }
        checked += 1;

        let exact = solve_exact(&Objective::new(&problem, &cfg)).unwrap();
        assert!(
            within_budgets(&problem, |i| exact.assignment.get(i)),
            "seed {seed}"
        );
    }
    assert!(checked > 10, "too few feasible fixtures: {checked}");
}

#[test]
fn empty_catalog_returns_empty_selection() {
    let constraints = Constraints::new(120, 0.0, 100.0);
    let result = optimize(&[], Goal::StabilizeCashflow, constraints, &[], 500.0).unwrap();
    assert!(result.selected_ids.is_empty());
    assert_eq!(result.score, 0.0);
    assert_eq!(result.solver_used, SolverKind::Greedy);
    assert_eq!(result.metrics.effort_used, 0);
    assert_eq!(result.metrics.cash_used, 0.0);
    assert_eq!(result.metrics.projected_balance, 0.0);
}

fn scenario_actions() -> Vec<ActionRecord> {
    vec![
        ActionRecord::new("A", "Cancel unused subscription")
            .with_effort(15)
            .with_cashflow(30.0)
            .with_risk(2.0),
        ActionRecord::new("B", "Negotiate internet bill")
            .with_effort(30)
            .with_cashflow(50.0)
            .with_risk(1.0)
            .with_conflict("A"),
    ]
}

#[test]
fn conflicting_pair_picks_higher_goal_weighted_value() {
    let actions = scenario_actions();
    let constraints = Constraints::new(120, 0.0, 100.0);
    let result = optimize(&actions, Goal::StabilizeCashflow, constraints, &[], 500.0).unwrap();

    assert_eq!(result.selected_ids.len(), 1);
    let scale = SolverConfig::default().benefit_scale;
    let values = coach_core::value_vector(&actions, Goal::StabilizeCashflow, scale);
    let expected = if values[0] > values[1] { "A" } else { "B" };
    assert_eq!(result.selected_ids, vec![expected.to_string()]);
    assert_eq!(expected, "B");
    assert!(result.metrics.buffer_respected);
    assert_eq!(result.metrics.cash_used, 0.0);
}

#[test]
fn required_action_overrides_better_conflicting_choice() {
    // A is now clearly the better action on its own.
    let mut actions = scenario_actions();
    actions[0] = actions[0].clone().with_cashflow(80.0).with_risk(5.0);
    let constraints = Constraints::new(120, 0.0, 100.0);

    let free = optimize(&actions, Goal::StabilizeCashflow, constraints, &[], 500.0).unwrap();
    assert_eq!(free.selected_ids, vec!["A".to_string()]);

    let required = ["B".to_string()];
    let forced =
        optimize(&actions, Goal::StabilizeCashflow, constraints, &required, 500.0).unwrap();
    assert_eq!(forced.selected_ids, vec!["B".to_string()]);
    assert!(!forced.is_selected("A"));
    assert!(forced.score < free.score);
    assert!(forced.diagnostics.missing_required_ids.is_empty());
    assert_eq!(forced.diagnostics.conflict_pairs_selected, 0);
}

#[test]
fn required_action_kept_when_budget_cannot_fit_it() {
    // Required action alone blows the effort budget; the result still carries it
    // and reports the penalty instead of failing.
    let actions = vec![
        ActionRecord::new("call-lender", "Call lender about hardship plan")
            .with_effort(90)
            .with_risk(9.0),
        ActionRecord::new("autopay", "Turn on autopay").with_effort(5).with_risk(3.0),
    ];
    let result = optimize(
        &actions,
        Goal::PayDownDebt,
        Constraints::new(0, 0.0, 0.0),
        &["call-lender".to_string()],
        100.0,
    )
    .unwrap();

    assert!(result.is_selected("call-lender"));
    assert!(!result.metrics.effort_within_budget);
    assert!(result.diagnostics.penalties.effort > 0.0);
    assert!(result.score < 0.0);
}

#[test]
fn snapshot_round_trips_through_json_request() {
    let mut req = OptimizeRequest::new(
        scenario_actions(),
        Goal::PayDownDebt,
        Constraints::new(60, 25.0, 0.0),
        300.0,
    );
    req.snapshot = FinancialSnapshot {
        starting_balance: 300.0,
        monthly_income: 2500.0,
        monthly_spend: 2400.0,
        risk_flags: vec!["high_apr_debt".to_string()],
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: OptimizeRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, req);

    let result = Optimizer::default().solve(&back).unwrap();
    let out = serde_json::to_value(&result).unwrap();
    assert_eq!(out["solver_used"], "exact");
}
