//! Admin role management endpoints.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use showcase_scoring::Role;
use uuid::Uuid;

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::models::UserRole;
use crate::state::AppState;

/// Request body for granting or revoking a role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub user_id: Uuid,
    pub role: Role,
}

/// Response for a revoke call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRoleResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub role: Role,
}

/// Creates the roles router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/roles", post(grant_role).delete(revoke_role))
        .with_state(state)
}

/// POST /api/v1/admin/roles
async fn grant_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<RoleRequest>,
) -> Result<(StatusCode, Json<UserRole>), AppError> {
    let granted: UserRole = sqlx::query_as(
        r#"
        INSERT INTO user_roles (id, user_id, role, created_at)
        VALUES (gen_random_uuid(), $1, $2, NOW())
        RETURNING id, user_id, role, created_at
        "#,
    )
    .bind(request.user_id)
    .bind(request.role)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::from_store("Failed to grant role", e))?;

    tracing::info!(
        user_id = %request.user_id,
        role = %request.role,
        granted_by = %admin.user_id,
        "Role granted"
    );

    Ok((StatusCode::CREATED, Json(granted)))
}

/// DELETE /api/v1/admin/roles
async fn revoke_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<RoleRequest>,
) -> Result<Json<RevokeRoleResponse>, AppError> {
    if request.user_id == admin.user_id && request.role == Role::Admin {
        return Err(AppError::BadRequest(
            "Admins cannot revoke their own admin role".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        DELETE FROM user_roles
        WHERE user_id = $1 AND role = $2
        "#,
    )
    .bind(request.user_id)
    .bind(request.role)
    .execute(&state.pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to revoke role: {}", e)))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "User {} does not have the {} role",
            request.user_id, request.role
        )));
    }

    tracing::info!(
        user_id = %request.user_id,
        role = %request.role,
        revoked_by = %admin.user_id,
        "Role revoked"
    );

    Ok(Json(RevokeRoleResponse {
        success: true,
        user_id: request.user_id,
        role: request.role,
    }))
}
