//! Judge assignment endpoints.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use showcase_scoring::{
    plan_assignments, unassigned_products, Assignment, Product, Role, UnassignedScope,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{load_roles, ActingUser, RequireAdmin};
use crate::error::AppError;
use crate::models::{JudgeProduct, NewNotification};
use crate::notify::spawn_notification;
use crate::queries::{load_approved_products, load_products_by_ids};
use crate::state::AppState;

/// Request body for assigning products to a judge.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProductsRequest {
    /// The judge receiving the products.
    pub judge_id: Uuid,
    /// Products to assign; duplicates are collapsed.
    pub product_ids: Vec<Uuid>,
}

/// Response for a successful assignment batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProductsResponse {
    pub success: bool,
    pub judge_id: Uuid,
    pub assignments: Vec<Assignment>,
}

/// Query parameters for the unassigned-products listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedQuery {
    /// Restrict to products this judge lacks; omit for the global pool.
    #[serde(default)]
    pub judge_id: Option<Uuid>,
}

/// Unassigned products, or an empty list and the reason when the lookup failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedProductsResponse {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A judge's worklist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeProductsResponse {
    pub judge_id: Uuid,
    pub products: Vec<JudgeProduct>,
}

/// Creates the assignment router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/assignments", post(assign_products))
        .route("/admin/products/unassigned", get(list_unassigned_products))
        .route("/judges/{judge_id}/products", get(list_judge_products))
        .with_state(state)
}

/// Fails unless `judge_id` holds the judge role.
async fn ensure_is_judge(pool: &PgPool, judge_id: Uuid) -> Result<(), AppError> {
    let roles = load_roles(pool, judge_id).await?;
    if !roles.contains(&Role::Judge) {
        return Err(AppError::BadRequest(format!(
            "User {} does not have the judge role",
            judge_id
        )));
    }
    Ok(())
}

/// Product ids among `candidates` already assigned to the judge.
async fn load_existing_assignments(
    pool: &PgPool,
    judge_id: Uuid,
    candidates: &[Uuid],
) -> Result<HashSet<Uuid>, AppError> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT product_id
        FROM judge_assignments
        WHERE judge_id = $1 AND product_id = ANY($2)
        "#,
    )
    .bind(judge_id)
    .bind(candidates)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query assignments: {}", e)))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Assigns approved products to a judge.
///
/// POST /api/v1/admin/assignments
///
/// The batch is inserted in one transaction: either every product is
/// assigned or none is.
async fn assign_products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<AssignProductsRequest>,
) -> Result<(StatusCode, Json<AssignProductsResponse>), AppError> {
    let pool = &state.pool;

    // Step 1: The target must be a judge
    ensure_is_judge(pool, request.judge_id).await?;

    // Step 2: Validate the selection against the catalogue and existing rows
    let catalog = load_products_by_ids(pool, &request.product_ids).await?;
    let existing = load_existing_assignments(pool, request.judge_id, &request.product_ids).await?;
    let product_ids = plan_assignments(&request.product_ids, &catalog, &existing)?;

    // Step 3: Insert the batch atomically
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

    let mut assignments = Vec::with_capacity(product_ids.len());
    for product_id in &product_ids {
        let assignment: Assignment = sqlx::query_as(
            r#"
            INSERT INTO judge_assignments (id, judge_id, product_id, assigned_by, assigned_at)
            VALUES (gen_random_uuid(), $1, $2, $3, NOW())
            RETURNING id, judge_id, product_id, assigned_by, assigned_at
            "#,
        )
        .bind(request.judge_id)
        .bind(product_id)
        .bind(admin.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_store("Failed to insert assignment", e))?;
        assignments.push(assignment);
    }

    tx.commit()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(
        judge_id = %request.judge_id,
        assigned_by = %admin.user_id,
        count = assignments.len(),
        "Products assigned to judge"
    );

    // Step 4: Let the judge know
    spawn_notification(
        pool,
        NewNotification::assignment(request.judge_id, assignments.len()),
    );

    Ok((
        StatusCode::CREATED,
        Json(AssignProductsResponse {
            success: true,
            judge_id: request.judge_id,
            assignments,
        }),
    ))
}

/// Product ids excluded from the unassigned listing for `scope`.
async fn load_assigned_ids(pool: &PgPool, scope: UnassignedScope) -> Result<HashSet<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = match scope {
        UnassignedScope::Judge(judge_id) => {
            sqlx::query_as(
                r#"
                SELECT product_id
                FROM judge_assignments
                WHERE judge_id = $1
                "#,
            )
            .bind(judge_id)
            .fetch_all(pool)
            .await?
        }
        UnassignedScope::Global => {
            sqlx::query_as(
                r#"
                SELECT DISTINCT product_id
                FROM judge_assignments
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

impl UnassignedProductsResponse {
    /// Lookup failures become an empty list plus the reason.
    fn from_lookup(result: Result<Vec<Product>, &str>) -> Self {
        match result {
            Ok(products) => Self {
                products,
                error: None,
            },
            Err(reason) => Self {
                products: Vec::new(),
                error: Some(reason.to_string()),
            },
        }
    }
}

async fn lookup_unassigned(pool: &PgPool, scope: UnassignedScope) -> Result<Vec<Product>, &'static str> {
    let catalog = load_approved_products(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load approved products");
        "Failed to load products"
    })?;
    let assigned = load_assigned_ids(pool, scope).await.map_err(|e| {
        tracing::error!(error = %e, ?scope, "Failed to load assignments");
        "Failed to load assignments"
    })?;

    Ok(unassigned_products(&catalog, &assigned))
}

/// Lists approved products not yet assigned.
///
/// GET /api/v1/admin/products/unassigned?judgeId=
///
/// With `judgeId` the listing excludes that judge's assignments; without it,
/// products assigned to any judge are excluded. Lookup failures answer with
/// an empty list so the admin screen stays usable.
async fn list_unassigned_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UnassignedQuery>,
) -> Json<UnassignedProductsResponse> {
    let scope = UnassignedScope::from_judge(query.judge_id);
    Json(UnassignedProductsResponse::from_lookup(
        lookup_unassigned(&state.pool, scope).await,
    ))
}

/// Lists a judge's assigned products with their evaluation progress.
///
/// GET /api/v1/judges/{judge_id}/products
async fn list_judge_products(
    State(state): State<AppState>,
    user: ActingUser,
    Path(judge_id): Path<Uuid>,
) -> Result<Json<JudgeProductsResponse>, AppError> {
    user.ensure_self_or_admin(judge_id)?;

    let mut products: Vec<JudgeProduct> = sqlx::query_as(
        r#"
        SELECT
            p.id AS product_id,
            p.name AS product_name,
            p.tagline,
            p.image_url,
            p.status AS product_status,
            a.assigned_at,
            COALESCE(s.status, 'pending') AS evaluation_status,
            COALESCE(s.priority, 'medium') AS priority,
            s.deadline,
            s.notes,
            (
                SELECT COUNT(*)
                FROM judge_submissions js
                WHERE js.judge_id = a.judge_id
                  AND js.product_id = a.product_id
                  AND (js.rating_value IS NOT NULL
                       OR js.boolean_value IS NOT NULL
                       OR NULLIF(btrim(js.text_value), '') IS NOT NULL)
            ) AS answered_criteria,
            (SELECT COUNT(*) FROM criteria) AS total_criteria
        FROM judge_assignments a
        JOIN products p ON p.id = a.product_id
        LEFT JOIN judge_evaluation_status s
            ON s.judge_id = a.judge_id AND s.product_id = a.product_id
        WHERE a.judge_id = $1
        ORDER BY a.assigned_at DESC, p.name
        "#,
    )
    .bind(judge_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query judge products: {}", e)))?;

    let now = Utc::now();
    for product in &mut products {
        product.mark_overdue(now);
    }

    Ok(Json(JudgeProductsResponse { judge_id, products }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_scoring::ProductStatus;

    #[test]
    fn test_failed_lookup_answers_empty_list_with_reason() {
        let body = UnassignedProductsResponse::from_lookup(Err("Failed to load assignments"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["products"], serde_json::json!([]));
        assert_eq!(json["error"], "Failed to load assignments");
    }

    #[test]
    fn test_successful_lookup_omits_error() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Lantern".to_string(),
            tagline: None,
            status: ProductStatus::Approved,
            image_url: None,
        };
        let json =
            serde_json::to_value(UnassignedProductsResponse::from_lookup(Ok(vec![product]))).unwrap();
        assert_eq!(json["products"].as_array().unwrap().len(), 1);
        assert!(json.get("error").is_none());
    }
}
