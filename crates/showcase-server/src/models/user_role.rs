use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_scoring::Role;
use sqlx::FromRow;
use uuid::Uuid;

/// A role granted to a user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
