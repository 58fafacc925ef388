//! Explainability report: per-action score decomposition, ranked reasons and
//! budget utilization. Read-only over the `SolverResult`.

use crate::problem::Problem;
use crate::result::SolverResult;
use crate::value::value_breakdown;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOP_REASONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContribution {
    pub id: String,
    pub title: String,
    pub goal_component: f64,
    pub cash_component: f64,
    pub risk_component: f64,
    /// Half of each synergy bonus the action takes part in.
    pub synergy_share: f64,
    /// Portion of the constraint and conflict penalties attributed to this action.
    pub penalty_share: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub top_reasons: Vec<String>,
    /// Selected actions, highest total first.
    pub action_contributions: Vec<ActionContribution>,
    pub constraint_notes: Vec<String>,
    pub solver_note: String,
}

pub fn explain(problem: &Problem<'_>, result: &SolverResult) -> Explanation {
    let actions = problem.actions();
    let index: HashMap<&str, usize> = actions
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.as_str(), i))
        .collect();
    let selected: Vec<usize> = result
        .selected_ids
        .iter()
        .filter_map(|id| index.get(id.as_str()).copied())
        .collect();
    let mut is_selected = vec![false; actions.len()];
    for &i in &selected {
        is_selected[i] = true;
    }

    let mut contributions: Vec<ActionContribution> = selected
        .iter()
        .map(|&i| contribution(problem, result, &is_selected, i))
        .collect();
    contributions.sort_by(|a, b| b.total.total_cmp(&a.total));

    Explanation {
        top_reasons: top_reasons(problem, result, &contributions, &is_selected),
        constraint_notes: constraint_notes(problem, result),
        solver_note: result
            .diagnostics
            .notes
            .first()
            .cloned()
            .unwrap_or_else(|| "nothing to optimize".to_string()),
        action_contributions: contributions,
    }
}

fn contribution(
    problem: &Problem<'_>,
    result: &SolverResult,
    is_selected: &[bool],
    i: usize,
) -> ActionContribution {
    let action = &problem.actions()[i];
    let parts = value_breakdown(action, problem.goal(), &problem.normalizer, problem.benefit_scale);
    let pen = &result.diagnostics.penalties;
    let m = &result.metrics;

    let selected_neighbors = |adj: &[usize]| adj.iter().filter(|&&j| is_selected[j]).count() as f64;
    let synergy_pairs = selected_pairs(problem.synergy_pairs(), is_selected);
    let conflict_pairs = selected_pairs(problem.conflict_pairs(), is_selected);

    let synergy_share = share(
        pen.synergy_bonus,
        selected_neighbors(problem.synergies_of(i)),
        2.0 * synergy_pairs,
    );
    let conflict_share = share(
        pen.conflict,
        selected_neighbors(problem.conflicts_of(i)),
        2.0 * conflict_pairs,
    );
    let effort_share = share(pen.effort, f64::from(action.effort_minutes), m.effort_used as f64);
    let cash_share = share(pen.cash, action.upfront_cash_cost, m.cash_used);

    let drain = |delta: f64| (-delta).max(0.0);
    let total_drain: f64 = (0..is_selected.len())
        .filter(|&j| is_selected[j])
        .map(|j| drain(problem.actions()[j].monthly_cashflow_delta))
        .sum();
    let buffer_share = share(pen.buffer, drain(action.monthly_cashflow_delta), total_drain);

    let penalty_share = conflict_share + effort_share + cash_share + buffer_share;
    ActionContribution {
        id: action.id.clone(),
        title: action.display_name().to_string(),
        goal_component: parts.goal,
        cash_component: parts.cash,
        risk_component: parts.risk,
        synergy_share,
        penalty_share,
        total: parts.total() + synergy_share - penalty_share,
    }
}

fn selected_pairs(pairs: &[(usize, usize)], is_selected: &[bool]) -> f64 {
    pairs
        .iter()
        .filter(|&&(i, j)| is_selected[i] && is_selected[j])
        .count() as f64
}

fn share(amount: f64, part: f64, whole: f64) -> f64 {
    if whole > 0.0 { amount * part / whole } else { 0.0 }
}

fn top_reasons(
    problem: &Problem<'_>,
    result: &SolverResult,
    contributions: &[ActionContribution],
    is_selected: &[bool],
) -> Vec<String> {
    let mut reasons = Vec::new();

    for (rank, c) in contributions.iter().take(TOP_REASONS).enumerate() {
        let lead = if rank == 0 {
            format!("{} selected for highest combined value", c.title)
        } else {
            format!("{} selected", c.title)
        };
        reasons.push(format!(
            "{lead} ({:.1} pts: cash {:.1}, risk {:.1}, goal fit {:.1})",
            c.total, c.cash_component, c.risk_component, c.goal_component
        ));
    }
    if contributions.is_empty() {
        reasons.push("No action improved the score within the current budgets.".to_string());
    }

    reasons.push(problem.goal().rationale().to_string());

    let actions = problem.actions();
    for i in 0..actions.len() {
        if is_selected[i] || !problem.is_eligible(i) {
            continue;
        }
        if let Some(&j) = problem.conflicts_of(i).iter().find(|&&j| is_selected[j]) {
            reasons.push(format!(
                "{} skipped due to conflict with selected action {}",
                actions[i].display_name(),
                actions[j].display_name()
            ));
        }
    }

    for id in &result.diagnostics.missing_required_ids {
        reasons.push(format!("Required action {id} could not be included"));
    }
    reasons
}

fn constraint_notes(problem: &Problem<'_>, result: &SolverResult) -> Vec<String> {
    let c = problem.constraints();
    let m = &result.metrics;
    let mut notes = vec![
        format!(
            "Effort: {} of {} minutes ({})",
            m.effort_used,
            c.max_effort_minutes,
            utilization(m.effort_used as f64, f64::from(c.max_effort_minutes))
        ),
        format!(
            "Upfront cash: ${:.2} of ${:.2} ({})",
            m.cash_used,
            c.max_upfront_cash,
            utilization(m.cash_used, c.max_upfront_cash)
        ),
    ];

    // An empty catalog reports zeroed metrics, so there is no balance to compare.
    if !problem.is_empty() {
        let gap = m.projected_balance - c.min_balance_after;
        notes.push(if m.buffer_respected {
            format!(
                "Projected balance ${:.2} keeps ${:.2} above the ${:.2} minimum",
                m.projected_balance, gap, c.min_balance_after
            )
        } else {
            format!(
                "Projected balance ${:.2} falls ${:.2} short of the ${:.2} minimum",
                m.projected_balance, -gap, c.min_balance_after
            )
        });
    }

    let snap = problem.snapshot();
    if snap.monthly_income != 0.0 || snap.monthly_spend != 0.0 {
        let delta = m.projected_balance - snap.starting_balance;
        notes.push(format!(
            "Monthly margin: ${:.2} before actions, ${:.2} after",
            snap.net_monthly_margin(),
            snap.net_monthly_margin() + delta
        ));
    }
    if !snap.risk_flags.is_empty() {
        notes.push(format!("Active risk flags: {}", snap.risk_flags.join(", ")));
    }
    notes
}

fn utilization(used: f64, budget: f64) -> String {
    if budget > 0.0 {
        format!("{:.1}%", used / budget * 100.0)
    } else if used <= 0.0 {
        "0.0%".to_string()
    } else {
        "over a zero budget".to_string()
    }
}
