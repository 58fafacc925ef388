use anyhow::{Context, Result};
use coach_core::{Explanation, Goal, SolverResult};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    goal: Goal,
    result: &'a SolverResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<&'a Explanation>,
}

pub fn render_json(
    goal: Goal,
    result: &SolverResult,
    explanation: Option<&Explanation>,
) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        goal,
        result,
        explanation,
    })
    .context("serialize result")
}

pub fn render_text(
    goal: Goal,
    result: &SolverResult,
    explanation: Option<&Explanation>,
) -> Result<String> {
    let mut out = String::new();
    let m = &result.metrics;

    writeln!(out, "Goal: {goal}")?;
    writeln!(out, "Solver: {} (score {:.2})", result.solver_used, result.score)?;
    writeln!(out, "Selected ({}):", result.selected_ids.len())?;
    if result.selected_ids.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for id in &result.selected_ids {
        writeln!(out, "  - {id}")?;
    }
    writeln!(
        out,
        "Effort {} min | Upfront ${:.2} | Projected balance ${:.2} ({})",
        m.effort_used,
        m.cash_used,
        m.projected_balance,
        if m.buffer_respected { "buffer ok" } else { "below buffer" }
    )?;

    if !result.diagnostics.notes.is_empty() {
        writeln!(out, "\nNotes:")?;
        for n in &result.diagnostics.notes {
            writeln!(out, "  - {n}")?;
        }
    }

    if let Some(ex) = explanation {
        writeln!(out, "\nWhy:")?;
        for r in &ex.top_reasons {
            writeln!(out, "  - {r}")?;
        }
        writeln!(out, "\nBudgets:")?;
        for n in &ex.constraint_notes {
            writeln!(out, "  - {n}")?;
        }
        if !ex.action_contributions.is_empty() {
            writeln!(out, "\nContributions:")?;
            writeln!(
                out,
                "  {:<24} {:>9} {:>8} {:>8} {:>8} {:>8} {:>9}",
                "action", "total", "goal", "cash", "risk", "synergy", "penalty"
            )?;
            for c in &ex.action_contributions {
                writeln!(
                    out,
                    "  {:<24} {:>9.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>9.2}",
                    c.id,
                    c.total,
                    c.goal_component,
                    c.cash_component,
                    c.risk_component,
                    c.synergy_share,
                    c.penalty_share
                )?;
            }
        }
    }
    Ok(out)
}
