//! Request validation and index resolution.
//!
//! A `Problem` is the catalog turned into an arena: every id cross-reference is
//! resolved to a dense index once, so the objective never does string lookups
//! inside a solver loop.

use crate::action::ActionRecord;
use crate::config::SolverConfig;
use crate::constraints::{Constraints, FinancialSnapshot};
use crate::error::{OptimizeError, Result};
use crate::goal::Goal;
use crate::value::{Normalizer, value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Everything one optimization call needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizeRequest {
    pub actions: Vec<ActionRecord>,
    pub goal: Goal,
    pub constraints: Constraints,
    #[serde(default)]
    pub required_action_ids: Vec<String>,
    pub snapshot: FinancialSnapshot,
}

impl OptimizeRequest {
    pub fn new(
        actions: Vec<ActionRecord>,
        goal: Goal,
        constraints: Constraints,
        starting_balance: f64,
    ) -> Self {
        Self {
            actions,
            goal,
            constraints,
            required_action_ids: Vec::new(),
            snapshot: FinancialSnapshot::with_balance(starting_balance),
        }
    }

    pub fn with_required(mut self, id: impl Into<String>) -> Self {
        self.required_action_ids.push(id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Problem<'a> {
    pub(crate) actions: &'a [ActionRecord],
    pub(crate) goal: Goal,
    pub(crate) constraints: Constraints,
    pub(crate) snapshot: &'a FinancialSnapshot,
    pub(crate) normalizer: Normalizer,
    pub(crate) benefit_scale: f64,
    pub(crate) values: Vec<f64>,
    pub(crate) required: Vec<bool>,
    pub(crate) eligible: Vec<bool>,
    /// Unordered pairs (i, j) with i < j, each listed once.
    pub(crate) conflict_pairs: Vec<(usize, usize)>,
    pub(crate) synergy_pairs: Vec<(usize, usize)>,
    /// Symmetric adjacency built from the pair lists.
    pub(crate) conflicts: Vec<Vec<usize>>,
    pub(crate) synergies: Vec<Vec<usize>>,
}

impl<'a> Problem<'a> {
    /// Validate `request` and resolve it into index form.
    pub fn build(request: &'a OptimizeRequest, config: &SolverConfig) -> Result<Self> {
        config.validate()?;
        validate_numbers(request)?;

        let actions = request.actions.as_slice();
        if actions.len() > config.max_catalog_size {
            return Err(OptimizeError::CatalogTooLarge {
                size: actions.len(),
                max: config.max_catalog_size,
            });
        }

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(actions.len());
        for (i, a) in actions.iter().enumerate() {
            if index.insert(a.id.as_str(), i).is_some() {
                return Err(OptimizeError::DuplicateActionId(a.id.clone()));
            }
        }

        let conflict_pairs =
            resolve_pairs(actions, &index, "conflicts_with", |a| &a.conflicts_with)?;
        let synergy_pairs = resolve_pairs(actions, &index, "synergy_with", |a| &a.synergy_with)?;

        let mut required = vec![false; actions.len()];
        for id in &request.required_action_ids {
            let i = *index
                .get(id.as_str())
                .ok_or_else(|| OptimizeError::UnknownRequiredAction(id.clone()))?;
            if !actions[i].eligible {
                return Err(OptimizeError::IneligibleRequiredAction(id.clone()));
            }
            required[i] = true;
        }

        let normalizer = Normalizer::from_actions(actions);
        let values = actions
            .iter()
            .map(|a| value(a, request.goal, &normalizer, config.benefit_scale))
            .collect();

        Ok(Self {
            actions,
            goal: request.goal,
            constraints: request.constraints,
            snapshot: &request.snapshot,
            normalizer,
            benefit_scale: config.benefit_scale,
            values,
            required,
            eligible: actions.iter().map(|a| a.eligible).collect(),
            conflicts: adjacency(actions.len(), &conflict_pairs),
            synergies: adjacency(actions.len(), &synergy_pairs),
            conflict_pairs,
            synergy_pairs,
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &'a [ActionRecord] {
        self.actions
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn snapshot(&self) -> &FinancialSnapshot {
        self.snapshot
    }

    pub fn starting_balance(&self) -> f64 {
        self.snapshot.starting_balance
    }

    /// Benefit values in catalog order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_required(&self, i: usize) -> bool {
        self.required[i]
    }

    pub fn is_eligible(&self, i: usize) -> bool {
        self.eligible[i]
    }

    pub fn conflict_pairs(&self) -> &[(usize, usize)] {
        &self.conflict_pairs
    }

    pub fn synergy_pairs(&self) -> &[(usize, usize)] {
        &self.synergy_pairs
    }

    pub fn conflicts_of(&self, i: usize) -> &[usize] {
        &self.conflicts[i]
    }

    pub fn synergies_of(&self, i: usize) -> &[usize] {
        &self.synergies[i]
    }

    pub fn required_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&i| self.required[i])
    }

    /// Eligible and not forced on: the indices a search may toggle.
    pub fn free_indices(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.eligible[i] && !self.required[i])
            .collect()
    }
}

fn validate_numbers(request: &OptimizeRequest) -> Result<()> {
    let c = &request.constraints;
    for (field, v) in [
        ("max_upfront_cash", c.max_upfront_cash),
        ("min_balance_after", c.min_balance_after),
    ] {
        if !v.is_finite() {
            return Err(OptimizeError::NonFiniteField {
                owner: "constraints".to_string(),
                field,
            });
        }
    }
    if !request.snapshot.starting_balance.is_finite() {
        return Err(OptimizeError::NonFiniteField {
            owner: "snapshot".to_string(),
            field: "starting_balance",
        });
    }

    for a in &request.actions {
        let mut fields = vec![
            ("upfront_cash_cost", a.upfront_cash_cost),
            ("monthly_cashflow_delta", a.monthly_cashflow_delta),
            ("risk_reduction_score", a.risk_reduction_score),
        ];
        fields.extend(a.goal_weights.values());
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(OptimizeError::NonFiniteField {
                owner: a.id.clone(),
                field,
            });
        }

        if a.effort_minutes < 0 {
            return Err(OptimizeError::NegativeEffort {
                action: a.id.clone(),
                minutes: a.effort_minutes,
            });
        }
        if a.upfront_cash_cost < 0.0 {
            return Err(OptimizeError::NegativeUpfrontCost {
                action: a.id.clone(),
                cost: a.upfront_cash_cost,
            });
        }
        if a.risk_reduction_score < 0.0 {
            return Err(OptimizeError::NegativeRiskReduction {
                action: a.id.clone(),
                score: a.risk_reduction_score,
            });
        }
    }
    Ok(())
}

fn resolve_pairs(
    actions: &[ActionRecord],
    index: &HashMap<&str, usize>,
    relation: &'static str,
    refs: impl Fn(&ActionRecord) -> &Vec<String>,
) -> Result<Vec<(usize, usize)>> {
    // BTreeSet dedups A->B / B->A and keeps pair order deterministic.
    let mut pairs = BTreeSet::new();
    for (i, a) in actions.iter().enumerate() {
        for other in refs(a) {
            let j = *index
                .get(other.as_str())
                .ok_or_else(|| OptimizeError::UnknownReference {
                    action: a.id.clone(),
                    reference: other.clone(),
                    relation,
                })?;
            if i == j {
                return Err(OptimizeError::SelfReference {
                    action: a.id.clone(),
                    relation,
                });
            }
            pairs.insert((i.min(j), i.max(j)));
        }
    }
    Ok(pairs.into_iter().collect())
}

fn adjacency(n: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n];
    for &(i, j) in pairs {
        adj[i].push(j);
        adj[j].push(i);
    }
    adj
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(actions: Vec<ActionRecord>) -> OptimizeRequest {
        OptimizeRequest::new(
            actions,
            Goal::StabilizeCashflow,
            Constraints::new(120, 0.0, 100.0),
            500.0,
        )
    }

    #[test]
    fn test_symmetric_conflict_counted_once() {
        let req = request(vec![
            ActionRecord::new("a", "A").with_conflict("b"),
            ActionRecord::new("b", "B").with_conflict("a"),
            ActionRecord::new("c", "C").with_synergy("a"),
        ]);
        let p = Problem::build(&req, &SolverConfig::default()).unwrap();
        assert_eq!(p.conflict_pairs(), &[(0, 1)]);
        assert_eq!(p.synergy_pairs(), &[(0, 2)]);
        assert_eq!(p.conflicts_of(1), &[0]);
        assert_eq!(p.synergies_of(0), &[2]);
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let req = request(vec![ActionRecord::new("a", "A").with_synergy("ghost")]);
        let err = Problem::build(&req, &SolverConfig::default()).unwrap_err();
        assert_eq!(
            err,
            OptimizeError::UnknownReference {
                action: "a".to_string(),
                reference: "ghost".to_string(),
                relation: "synergy_with",
            }
        );
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_self_reference_rejected() {
        let req = request(vec![ActionRecord::new("a", "A").with_conflict("a")]);
        assert!(matches!(
            Problem::build(&req, &SolverConfig::default()),
            Err(OptimizeError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_required_must_exist_and_be_eligible() {
        let req = request(vec![ActionRecord::new("a", "A").ineligible()]).with_required("a");
        assert_eq!(
            Problem::build(&req, &SolverConfig::default()).unwrap_err(),
            OptimizeError::IneligibleRequiredAction("a".to_string())
        );

        let req = request(vec![ActionRecord::new("a", "A")]).with_required("zzz");
        assert_eq!(
            Problem::build(&req, &SolverConfig::default()).unwrap_err(),
            OptimizeError::UnknownRequiredAction("zzz".to_string())
        );
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let req = request(vec![ActionRecord::new("a", "A").with_effort(-5)]);
        assert!(matches!(
            Problem::build(&req, &SolverConfig::default()),
            Err(OptimizeError::NegativeEffort { minutes: -5, .. })
        ));

        let req = request(vec![ActionRecord::new("a", "A").with_upfront_cost(-1.0)]);
        assert!(matches!(
            Problem::build(&req, &SolverConfig::default()),
            Err(OptimizeError::NegativeUpfrontCost { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_oversized_catalogs_rejected() {
        let req = request(vec![ActionRecord::new("a", "A"), ActionRecord::new("a", "A2")]);
        assert_eq!(
            Problem::build(&req, &SolverConfig::default()).unwrap_err(),
            OptimizeError::DuplicateActionId("a".to_string())
        );

        let cfg = SolverConfig {
            max_catalog_size: 1,
            ..SolverConfig::default()
        };
        let req = request(vec![ActionRecord::new("a", "A"), ActionRecord::new("b", "B")]);
        assert_eq!(
            Problem::build(&req, &cfg).unwrap_err(),
            OptimizeError::CatalogTooLarge { size: 2, max: 1 }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let req = request(vec![ActionRecord::new("a", "A").with_cashflow(f64::NAN)]);
        assert!(matches!(
            Problem::build(&req, &SolverConfig::default()),
            Err(OptimizeError::NonFiniteField { field: "monthly_cashflow_delta", .. })
        ));
    }

    #[test]
    fn test_free_indices_skip_required_and_ineligible() {
        let req = request(vec![
            ActionRecord::new("a", "A"),
            ActionRecord::new("b", "B").ineligible(),
            ActionRecord::new("c", "C"),
        ])
        .with_required("c");
        let p = Problem::build(&req, &SolverConfig::default()).unwrap();
        assert_eq!(p.free_indices(), vec![0]);
        assert_eq!(p.required_indices().collect::<Vec<_>>(), vec![2]);
    }
}
