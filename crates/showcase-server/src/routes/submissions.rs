//! Judge submission endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use showcase_scoring::{SubmissionField, SubmissionRecord, SubmissionValue};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::RequireJudge;
use crate::error::AppError;
use crate::queries::load_criterion;
use crate::state::AppState;

/// Request body for recording one field of a submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSubmissionRequest {
    /// Column to write: `rating_value`, `boolean_value` or `text_value`.
    pub field: SubmissionField,
    /// Untyped value, checked against `field` and the criterion.
    pub value: serde_json::Value,
}

/// The acting judge's answers for one product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsResponse {
    pub judge_id: Uuid,
    pub product_id: Uuid,
    pub submissions: Vec<SubmissionRecord>,
}

/// Creates the submissions router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submissions/{product_id}", get(list_submissions))
        .route(
            "/submissions/{product_id}/{criterion_id}",
            put(record_submission),
        )
        .with_state(state)
}

/// Fails unless the judge is assigned to the product.
pub(crate) async fn ensure_assigned(
    pool: &PgPool,
    judge_id: Uuid,
    product_id: Uuid,
) -> Result<(), AppError> {
    let assigned: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM judge_assignments
        WHERE judge_id = $1 AND product_id = $2
        "#,
    )
    .bind(judge_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query assignment: {}", e)))?;

    if assigned.is_none() {
        return Err(AppError::Forbidden(format!(
            "Judge is not assigned to product {}",
            product_id
        )));
    }
    Ok(())
}

/// Upsert that writes only `field` and `updated_at` on conflict.
///
/// `field` comes from a closed enum, so interpolating the column is safe.
fn upsert_sql(field: SubmissionField) -> String {
    let column = field.as_str();
    format!(
        r#"
        INSERT INTO judge_submissions (id, judge_id, product_id, criterion_id, {column}, created_at, updated_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, NOW(), NOW())
        ON CONFLICT (judge_id, product_id, criterion_id)
        DO UPDATE SET {column} = EXCLUDED.{column}, updated_at = NOW()
        RETURNING id, judge_id, product_id, criterion_id, rating_value, boolean_value, text_value, created_at, updated_at
        "#
    )
}

/// Records one field of the acting judge's answer to a criterion.
///
/// PUT /api/v1/submissions/{product_id}/{criterion_id}
///
/// Repeating a write with the same value leaves a single row holding that
/// value; only `updated_at` moves.
async fn record_submission(
    State(state): State<AppState>,
    RequireJudge(judge): RequireJudge,
    Path((product_id, criterion_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RecordSubmissionRequest>,
) -> Result<Json<SubmissionRecord>, AppError> {
    let pool = &state.pool;

    ensure_assigned(pool, judge.user_id, product_id).await?;

    let criterion = load_criterion(pool, criterion_id).await?;
    let value = SubmissionValue::from_json(request.field, &request.value)?;
    criterion.validate_value(&value)?;

    let sql = upsert_sql(value.field());
    let query = sqlx::query_as::<_, SubmissionRecord>(&sql)
        .bind(judge.user_id)
        .bind(product_id)
        .bind(criterion_id);
    let query = match value {
        SubmissionValue::Rating(v) => query.bind(v),
        SubmissionValue::Boolean(v) => query.bind(v),
        SubmissionValue::Text(v) => query.bind(v),
    };

    let record = query
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to record submission: {}", e)))?;

    tracing::debug!(
        judge_id = %judge.user_id,
        product_id = %product_id,
        criterion_id = %criterion_id,
        field = %request.field,
        "Submission recorded"
    );

    Ok(Json(record))
}

/// Lists the acting judge's answers for a product.
///
/// GET /api/v1/submissions/{product_id}
async fn list_submissions(
    State(state): State<AppState>,
    RequireJudge(judge): RequireJudge,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ListSubmissionsResponse>, AppError> {
    let submissions: Vec<SubmissionRecord> = sqlx::query_as(
        r#"
        SELECT id, judge_id, product_id, criterion_id, rating_value, boolean_value, text_value, created_at, updated_at
        FROM judge_submissions
        WHERE judge_id = $1 AND product_id = $2
        ORDER BY created_at
        "#,
    )
    .bind(judge.user_id)
    .bind(product_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query submissions: {}", e)))?;

    Ok(Json(ListSubmissionsResponse {
        judge_id: judge.user_id,
        product_id,
        submissions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_sql_touches_only_named_column() {
        let sql = upsert_sql(SubmissionField::BooleanValue);
        assert!(sql.contains("DO UPDATE SET boolean_value = EXCLUDED.boolean_value, updated_at = NOW()"));
        assert!(!sql.contains("rating_value = EXCLUDED"));
        assert!(!sql.contains("text_value = EXCLUDED"));
    }

    #[test]
    fn test_request_parses_field_names() {
        let request: RecordSubmissionRequest =
            serde_json::from_value(serde_json::json!({"field": "rating_value", "value": 4})).unwrap();
        assert_eq!(request.field, SubmissionField::RatingValue);
        assert_eq!(request.value, serde_json::json!(4));
    }
}
