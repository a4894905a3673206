use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_scoring::{EvaluationState, Priority, ProductStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// One product on a judge's worklist, joined with their evaluation progress.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub tagline: Option<String>,
    pub image_url: Option<String>,
    pub product_status: ProductStatus,
    pub assigned_at: DateTime<Utc>,
    /// `pending` when the judge has not touched the evaluation yet.
    pub evaluation_status: EvaluationState,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Criteria the judge has recorded at least one answer for.
    pub answered_criteria: i64,
    pub total_criteria: i64,
    /// Deadline passed while the evaluation is still open. Set by
    /// [`JudgeProduct::mark_overdue`].
    #[sqlx(skip)]
    #[serde(default)]
    pub overdue: bool,
}

impl JudgeProduct {
    pub fn is_completed(&self) -> bool {
        self.evaluation_status == EvaluationState::Completed
    }

    /// Whether the deadline has passed without the evaluation being completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.deadline.is_some_and(|deadline| deadline < now)
    }

    pub fn mark_overdue(&mut self, now: DateTime<Utc>) {
        self.overdue = self.is_overdue(now);
    }
}
