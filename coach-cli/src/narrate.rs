//! Turns a solved selection into a short weekly plan the user reads.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use coach_core::{ActionRecord, Explanation, OptimizeRequest, SolverResult};
use std::collections::HashMap;
use std::fmt::Write as _;

pub struct PlanContext<'a> {
    pub request: &'a OptimizeRequest,
    pub result: &'a SolverResult,
    pub explanation: &'a Explanation,
    pub week_of: NaiveDate,
}

/// Anything that can phrase a plan. The template version never fails; the
/// trait leaves room for a model-backed narrator.
pub trait PlanNarrator {
    fn narrate(&self, ctx: &PlanContext<'_>) -> Result<String>;
}

pub struct TemplateNarrator {
    pub max_actions: usize,
}

impl Default for TemplateNarrator {
    fn default() -> Self {
        Self { max_actions: 5 }
    }
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

impl PlanNarrator for TemplateNarrator {
    fn narrate(&self, ctx: &PlanContext<'_>) -> Result<String> {
        let by_id: HashMap<&str, &ActionRecord> =
            ctx.request.actions.iter().map(|a| (a.id.as_str(), a)).collect();
        let goal = ctx.request.goal;
        let mut out = String::new();

        writeln!(out, "# Weekly plan, week of {}", ctx.week_of.format("%Y-%m-%d"))?;
        writeln!(out)?;
        writeln!(out, "**Goal:** {goal}. {}", goal.rationale())?;
        writeln!(out)?;

        writeln!(out, "## This week")?;
        writeln!(out)?;
        // Highest contribution first, the order the explanation already uses.
        let ordered: Vec<&str> = ctx
            .explanation
            .action_contributions
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        if ordered.is_empty() {
            writeln!(
                out,
                "Nothing to add this week; your current budgets are already spoken for."
            )?;
        }
        for (n, id) in ordered.iter().take(self.max_actions).enumerate() {
            let Some(action) = by_id.get(id) else { continue };
            writeln!(
                out,
                "{}. **{}** ({} min){}",
                n + 1,
                action.display_name(),
                action.effort_minutes,
                money_phrase(action)
            )?;
        }
        if ordered.len() > self.max_actions {
            writeln!(out, "\n_and {} more_", ordered.len() - self.max_actions)?;
        }
        writeln!(out)?;

        writeln!(out, "## Budget check")?;
        writeln!(out)?;
        for note in &ctx.explanation.constraint_notes {
            writeln!(out, "- {note}")?;
        }
        writeln!(out)?;

        writeln!(out, "## Why these")?;
        writeln!(out)?;
        for reason in &ctx.explanation.top_reasons {
            writeln!(out, "- {reason}")?;
        }
        writeln!(out)?;
        writeln!(out, "_{}_", ctx.explanation.solver_note)?;
        if !ctx.result.diagnostics.missing_required_ids.is_empty() {
            writeln!(
                out,
                "\n> Could not fit: {}",
                ctx.result.diagnostics.missing_required_ids.join(", ")
            )?;
        }
        Ok(out)
    }
}

fn money_phrase(action: &ActionRecord) -> String {
    let mut parts = Vec::new();
    let delta = action.monthly_cashflow_delta;
    if delta > 0.0 {
        parts.push(format!("frees ${delta:.2}/month"));
    } else if delta < 0.0 {
        parts.push(format!("sets aside ${:.2}/month", -delta));
    }
    if action.upfront_cash_cost > 0.0 {
        parts.push(format!("${:.2} upfront", action.upfront_cash_cost));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(": {}", parts.join(", "))
    }
}
