//! Error types for the judging pipeline.

use uuid::Uuid;

use crate::evaluation::EvaluationState;
use crate::types::ProductStatus;

/// Failures raised by the pure judging logic.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Invalid criterion: {0}")]
    InvalidCriterion(String),

    #[error("No products selected for assignment")]
    EmptySelection,

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product {id} is {status} and cannot be assigned (only approved products can be judged)")]
    NotAssignable { id: Uuid, status: ProductStatus },

    #[error("Products already assigned to this judge: {}", join_ids(.0))]
    AlreadyAssigned(Vec<Uuid>),

    #[error("Invalid evaluation transition: {from} -> {to}")]
    InvalidTransition {
        from: EvaluationState,
        to: EvaluationState,
    },

    #[error("QR code encoding failed: {0}")]
    QrCode(String),

    #[error("Export failed: {0}")]
    Export(String),
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
