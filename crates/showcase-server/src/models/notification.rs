use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// New products were assigned to a judge.
    Assignment,
    /// An admin reopened a completed evaluation.
    EvaluationReopened,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::EvaluationReopened => "evaluation_reopened",
        }
    }
}

/// Data for creating a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl NewNotification {
    /// Tells a judge how many products were just assigned to them.
    pub fn assignment(judge_id: Uuid, count: usize) -> Self {
        let noun = if count == 1 { "product" } else { "products" };
        Self {
            user_id: judge_id,
            title: "New products to evaluate".to_string(),
            message: format!("You have been assigned {} new {} to judge.", count, noun),
            kind: NotificationKind::Assignment,
        }
    }

    /// Tells a judge an admin reopened one of their evaluations.
    pub fn evaluation_reopened(judge_id: Uuid, product_name: &str) -> Self {
        Self {
            user_id: judge_id,
            title: "Evaluation reopened".to_string(),
            message: format!("Your evaluation of {} was reopened by an admin.", product_name),
            kind: NotificationKind::EvaluationReopened,
        }
    }
}
