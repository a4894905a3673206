//! Evaluation status endpoints.

use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use showcase_scoring::{EvaluationState, EvaluationStatus, Priority, Transition};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireJudge};
use crate::error::AppError;
use crate::models::NewNotification;
use crate::notify::spawn_notification;
use crate::queries::load_product;
use crate::routes::submissions::ensure_assigned;
use crate::state::AppState;

/// Request body for saving an evaluation's status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    /// Requested status; the stored one may differ (see the transition table).
    pub status: EvaluationState,
    /// Omit to keep the current priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Omit to keep the current notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// RFC 3339 timestamp; omit to keep the current deadline.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// The stored evaluation and how it got there.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub evaluation: EvaluationStatus,
    pub transition: Transition,
}

/// Creates the evaluations router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/evaluations/{product_id}",
            put(set_status).get(get_status),
        )
        .route("/evaluations/{product_id}/complete", post(complete_evaluation))
        .route(
            "/admin/evaluations/{judge_id}/{product_id}/reopen",
            post(reopen_evaluation),
        )
        .with_state(state)
}

/// Loads the stored evaluation row, if any.
async fn load_evaluation(
    pool: &PgPool,
    judge_id: Uuid,
    product_id: Uuid,
) -> Result<Option<EvaluationStatus>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, judge_id, product_id, status, priority, deadline, notes, created_at, updated_at
        FROM judge_evaluation_status
        WHERE judge_id = $1 AND product_id = $2
        "#,
    )
    .bind(judge_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query evaluation status: {}", e)))
}

/// Resolves the transition and upserts the row.
///
/// Omitted optional fields keep their stored values. The conflict clause
/// refuses to move a completed row anywhere but `completed`, so a write
/// racing with completion cannot undo it.
async fn save_status(
    pool: &PgPool,
    judge_id: Uuid,
    product_id: Uuid,
    request: SetStatusRequest,
) -> Result<EvaluationResponse, AppError> {
    let current = load_evaluation(pool, judge_id, product_id).await?;

    let notes = request
        .notes
        .or_else(|| current.as_ref().and_then(|c| c.notes.clone()));
    let priority = request
        .priority
        .or_else(|| current.as_ref().map(|c| c.priority))
        .unwrap_or_default();
    let deadline = request
        .deadline
        .or_else(|| current.as_ref().and_then(|c| c.deadline));

    let transition = EvaluationState::transition(
        current.as_ref().map(|c| c.status),
        request.status,
        notes.as_deref(),
    )?;

    let evaluation: Option<EvaluationStatus> = sqlx::query_as(
        r#"
        INSERT INTO judge_evaluation_status (id, judge_id, product_id, status, priority, deadline, notes, created_at, updated_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, NOW(), NOW())
        ON CONFLICT (judge_id, product_id)
        DO UPDATE SET
            status = EXCLUDED.status,
            priority = EXCLUDED.priority,
            deadline = EXCLUDED.deadline,
            notes = EXCLUDED.notes,
            updated_at = NOW()
        WHERE judge_evaluation_status.status <> 'completed' OR EXCLUDED.status = 'completed'
        RETURNING id, judge_id, product_id, status, priority, deadline, notes, created_at, updated_at
        "#,
    )
    .bind(judge_id)
    .bind(product_id)
    .bind(transition.to)
    .bind(priority)
    .bind(deadline)
    .bind(&notes)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to save evaluation status: {}", e)))?;

    let evaluation = evaluation.ok_or_else(|| {
        AppError::Conflict("Evaluation was completed concurrently and cannot be changed".to_string())
    })?;

    tracing::info!(
        judge_id = %judge_id,
        product_id = %product_id,
        from = ?transition.from,
        to = %transition.to,
        rule = ?transition.rule,
        "Evaluation status saved"
    );

    Ok(EvaluationResponse {
        evaluation,
        transition,
    })
}

/// Saves the acting judge's status, priority, notes and deadline.
///
/// PUT /api/v1/evaluations/{product_id}
async fn set_status(
    State(state): State<AppState>,
    RequireJudge(judge): RequireJudge,
    Path(product_id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    ensure_assigned(&state.pool, judge.user_id, product_id).await?;
    let response = save_status(&state.pool, judge.user_id, product_id, request).await?;
    Ok(Json(response))
}

/// Returns the acting judge's evaluation row.
///
/// GET /api/v1/evaluations/{product_id}
async fn get_status(
    State(state): State<AppState>,
    RequireJudge(judge): RequireJudge,
    Path(product_id): Path<Uuid>,
) -> Result<Json<EvaluationStatus>, AppError> {
    let evaluation = load_evaluation(&state.pool, judge.user_id, product_id).await?;
    evaluation.map(Json).ok_or_else(|| {
        AppError::NotFound(format!("No evaluation recorded for product {}", product_id))
    })
}

/// Marks the acting judge's evaluation completed, whatever its state.
///
/// POST /api/v1/evaluations/{product_id}/complete
async fn complete_evaluation(
    State(state): State<AppState>,
    RequireJudge(judge): RequireJudge,
    Path(product_id): Path<Uuid>,
) -> Result<Json<EvaluationResponse>, AppError> {
    ensure_assigned(&state.pool, judge.user_id, product_id).await?;
    let request = SetStatusRequest {
        status: EvaluationState::Completed,
        priority: None,
        notes: None,
        deadline: None,
    };
    let response = save_status(&state.pool, judge.user_id, product_id, request).await?;
    Ok(Json(response))
}

/// Moves a completed evaluation back to `in_progress`.
///
/// POST /api/v1/admin/evaluations/{judge_id}/{product_id}/reopen
async fn reopen_evaluation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((judge_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let pool = &state.pool;
    let product = load_product(pool, product_id).await?;

    let current = load_evaluation(pool, judge_id, product_id).await?;
    let transition = EvaluationState::reopen(current.map(|c| c.status))?;

    let evaluation: Option<EvaluationStatus> = sqlx::query_as(
        r#"
        UPDATE judge_evaluation_status
        SET status = $3, updated_at = NOW()
        WHERE judge_id = $1 AND product_id = $2 AND status = 'completed'
        RETURNING id, judge_id, product_id, status, priority, deadline, notes, created_at, updated_at
        "#,
    )
    .bind(judge_id)
    .bind(product_id)
    .bind(transition.to)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to reopen evaluation: {}", e)))?;

    let evaluation = evaluation.ok_or_else(|| {
        AppError::Conflict("Evaluation is no longer completed".to_string())
    })?;

    tracing::info!(
        judge_id = %judge_id,
        product_id = %product_id,
        reopened_by = %admin.user_id,
        "Evaluation reopened"
    );

    spawn_notification(
        pool,
        NewNotification::evaluation_reopened(judge_id, &product.name),
    );

    Ok(Json(EvaluationResponse {
        evaluation,
        transition,
    }))
}
