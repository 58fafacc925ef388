//! Solver tuning. Every field has a default so partial TOML sections load.

use crate::error::{OptimizeError, Result};
use serde::{Deserialize, Serialize};

/// Exact enumeration uses `u32` masks; anything above this is never enumerated.
pub const MAX_EXACT_ACTIONS: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Catalogs up to this size are solved exactly.
    pub exact_max_actions: usize,
    /// Catalogs above this size are rejected.
    pub max_catalog_size: usize,

    pub anneal_iterations: u32,
    /// Multiplier on the largest |value| among flippable actions; the product
    /// is the annealing start temperature.
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub seed: u64,

    /// Points per unit of normalized benefit.
    pub benefit_scale: f64,
    pub synergy_bonus: f64,
    /// Floor for the per-pair conflict penalty; calibrated upward per catalog.
    pub conflict_penalty: f64,
    /// Floor for the per-id missing-required penalty; calibrated upward per catalog.
    pub required_penalty: f64,
    /// Quadratic weight per excess minute squared.
    pub effort_penalty: f64,
    /// Quadratic weight per excess dollar squared.
    pub cash_penalty: f64,
    /// Quadratic weight per dollar of buffer shortfall squared.
    pub buffer_penalty: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            exact_max_actions: 20,
            max_catalog_size: 512,
            anneal_iterations: 100_000,
            initial_temperature: 2.0,
            cooling_rate: 0.99994,
            seed: 42,
            benefit_scale: 100.0,
            synergy_bonus: 5.0,
            conflict_penalty: 1.0e6,
            required_penalty: 1.0e5,
            effort_penalty: 100.0,
            cash_penalty: 100.0,
            buffer_penalty: 100.0,
        }
    }
}

impl SolverConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Exact cutoff after clamping to what a `u32` mask can enumerate.
    pub fn exact_limit(&self) -> usize {
        if self.exact_max_actions > MAX_EXACT_ACTIONS {
            tracing::warn!(
                configured = self.exact_max_actions,
                clamped = MAX_EXACT_ACTIONS,
                "exact_max_actions clamped"
            );
        }
        self.exact_max_actions.min(MAX_EXACT_ACTIONS)
    }

    pub fn validate(&self) -> Result<()> {
        if self.anneal_iterations == 0 {
            return Err(OptimizeError::InvalidConfig(
                "anneal_iterations must be > 0".to_string(),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(OptimizeError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(OptimizeError::InvalidConfig(format!(
                "initial_temperature must be > 0, got {}",
                self.initial_temperature
            )));
        }
        if !(self.benefit_scale.is_finite() && self.benefit_scale > 0.0) {
            return Err(OptimizeError::InvalidConfig(format!(
                "benefit_scale must be > 0, got {}",
                self.benefit_scale
            )));
        }

        let weights = [
            ("synergy_bonus", self.synergy_bonus),
            ("conflict_penalty", self.conflict_penalty),
            ("required_penalty", self.required_penalty),
            ("effort_penalty", self.effort_penalty),
            ("cash_penalty", self.cash_penalty),
            ("buffer_penalty", self.buffer_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(OptimizeError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
