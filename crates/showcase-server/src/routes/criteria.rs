//! Criteria catalogue endpoints.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use showcase_scoring::types::DEFAULT_MAX_RATING;
use showcase_scoring::{Criterion, CriterionType};
use uuid::Uuid;

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::queries::load_criteria;
use crate::state::AppState;

/// Request body for creating a criterion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCriterionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub criterion_type: CriterionType,
    /// Defaults to 1.0.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Rating scale upper bound, defaults to 5.
    #[serde(default)]
    pub max_value: Option<i32>,
    /// Position in the judging form, lowest first.
    #[serde(default)]
    pub display_order: i32,
}

impl CreateCriterionRequest {
    fn into_criterion(self) -> Criterion {
        Criterion {
            id: Uuid::nil(),
            name: self.name.trim().to_string(),
            description: self.description,
            criterion_type: self.criterion_type,
            weight: self.weight.unwrap_or(1.0),
            max_value: self.max_value.unwrap_or(DEFAULT_MAX_RATING),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaResponse {
    pub criteria: Vec<Criterion>,
}

/// Creates the criteria router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/criteria", get(list_criteria))
        .route("/admin/criteria", post(create_criterion))
        .with_state(state)
}

/// GET /api/v1/criteria
async fn list_criteria(State(state): State<AppState>) -> Result<Json<CriteriaResponse>, AppError> {
    let criteria = load_criteria(&state.pool).await?;
    Ok(Json(CriteriaResponse { criteria }))
}

/// POST /api/v1/admin/criteria
async fn create_criterion(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateCriterionRequest>,
) -> Result<(StatusCode, Json<Criterion>), AppError> {
    let display_order = request.display_order;
    let criterion = request.into_criterion();
    criterion.validate()?;

    let created: Criterion = sqlx::query_as(
        r#"
        INSERT INTO criteria (id, name, description, type, weight, max_value, display_order, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, NOW())
        RETURNING id, name, description, type AS criterion_type, weight, max_value
        "#,
    )
    .bind(&criterion.name)
    .bind(&criterion.description)
    .bind(criterion.criterion_type)
    .bind(criterion.weight)
    .bind(criterion.max_value)
    .bind(display_order)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to create criterion: {}", e)))?;

    tracing::info!(
        criterion_id = %created.id,
        created_by = %admin.user_id,
        criterion_type = %created.criterion_type,
        "Criterion created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: CreateCriterionRequest =
            serde_json::from_value(serde_json::json!({"name": " Design ", "type": "rating"})).unwrap();
        let criterion = request.into_criterion();
        assert_eq!(criterion.name, "Design");
        assert_eq!(criterion.weight, 1.0);
        assert_eq!(criterion.max_value, 5);
        assert!(criterion.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_out_of_range_scale() {
        let request: CreateCriterionRequest = serde_json::from_value(serde_json::json!({
            "name": "Impact",
            "type": "rating",
            "maxValue": 11
        }))
        .unwrap();
        assert!(request.into_criterion().validate().is_err());
    }
}
