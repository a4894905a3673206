// Showcase Scoring - judging rules, aggregation and certificates for the Showcase platform

pub mod aggregate;
pub mod assignment;
pub mod certificate;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod fingerprint;
pub mod qr;
pub mod submission;
pub mod types;

pub use aggregate::{
    compute_leaderboard, overall_score, summarize_product, CriterionSummary, RankedProduct,
};
pub use assignment::{plan_assignments, unassigned_products, Assignment, UnassignedScope};
pub use certificate::{
    render_certificate, CertificateDocument, CertificateInput, CertificatePayload, Section,
    SectionKind,
};
pub use error::ScoringError;
pub use evaluation::{EvaluationState, EvaluationStatus, Priority, Transition, TransitionRule};
pub use export::leaderboard_csv;
pub use fingerprint::{fingerprint, jcs_canonical_bytes, sha256_hex};
pub use submission::{SubmissionField, SubmissionKey, SubmissionRecord, SubmissionValue};
pub use types::{Criterion, CriterionType, Person, Product, ProductStatus, Role};
