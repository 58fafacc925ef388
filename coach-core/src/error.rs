//! Validation errors raised before any solver runs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("duplicate action id: {0}")]
    DuplicateActionId(String),

    #[error("action {action} lists unknown id {reference} in {relation}")]
    UnknownReference {
        action: String,
        reference: String,
        relation: &'static str,
    },

    #[error("action {action} references itself in {relation}")]
    SelfReference {
        action: String,
        relation: &'static str,
    },

    #[error("action {action} has negative effort_minutes ({minutes})")]
    NegativeEffort { action: String, minutes: i32 },

    #[error("action {action} has negative upfront_cash_cost ({cost})")]
    NegativeUpfrontCost { action: String, cost: f64 },

    #[error("action {action} has negative risk_reduction_score ({score})")]
    NegativeRiskReduction { action: String, score: f64 },

    #[error("{owner}: {field} must be a finite number")]
    NonFiniteField { owner: String, field: &'static str },

    #[error("required action {0} is not in the catalog")]
    UnknownRequiredAction(String),

    #[error("required action {0} is not eligible")]
    IneligibleRequiredAction(String),

    #[error("catalog has {size} actions; the configured maximum is {max}")]
    CatalogTooLarge { size: usize, max: usize },

    #[error("invalid solver config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
