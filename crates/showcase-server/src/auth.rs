//! Acting-user resolution and role checks.
//!
//! The acting user arrives as a UUID in the `X-User-Id` header, set by the
//! authenticating gateway in front of this service. Roles are read from
//! `user_roles` on every request.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use showcase_scoring::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller and the roles they hold.
#[derive(Debug, Clone)]
pub struct ActingUser {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl ActingUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Allows the caller to act on `judge_id`'s data: themselves, or any judge if admin.
    pub fn ensure_self_or_admin(&self, judge_id: Uuid) -> Result<(), AppError> {
        if self.user_id == judge_id || self.is_admin() {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Judges may only access their own evaluations".to_string(),
        ))
    }
}

/// Parses the acting user id out of the request headers.
pub fn user_id_from_parts(parts: &Parts) -> Result<Uuid, AppError> {
    let raw = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Unauthorized("X-User-Id must be a UUID".to_string()))
}

/// Roles held by `user_id`.
pub async fn load_roles(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, AppError> {
    let rows: Vec<(Role,)> = sqlx::query_as(
        r#"
        SELECT role
        FROM user_roles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query roles: {}", e)))?;

    Ok(rows.into_iter().map(|(role,)| role).collect())
}

impl<S> FromRequestParts<S> for ActingUser
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_parts(parts)?;
        let pool = PgPool::from_ref(state);
        let roles = load_roles(&pool, user_id).await?;
        Ok(ActingUser { user_id, roles })
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub ActingUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = ActingUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `judge` role. Rejects with 403 Forbidden otherwise.
pub struct RequireJudge(pub ActingUser);

impl<S> FromRequestParts<S> for RequireJudge
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = ActingUser::from_request_parts(parts, state).await?;
        if !user.has_role(Role::Judge) {
            return Err(AppError::Forbidden("Judge role required".to_string()));
        }
        Ok(RequireJudge(user))
    }
}
