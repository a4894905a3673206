//! Read queries shared by several route modules.

use showcase_scoring::{Criterion, Person, Product, SubmissionRecord};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Loads a product by id.
pub async fn load_product(pool: &PgPool, product_id: Uuid) -> Result<Product, AppError> {
    let product: Option<Product> = sqlx::query_as(
        r#"
        SELECT id, name, tagline, status, image_url
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query product: {}", e)))?;

    product.ok_or_else(|| AppError::NotFound(format!("Product not found: {}", product_id)))
}

/// Loads the products among `ids` that exist, in any status.
pub async fn load_products_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, name, tagline, status, image_url
        FROM products
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query products: {}", e)))
}

/// Loads every approved product.
pub async fn load_approved_products(pool: &PgPool) -> Result<Vec<Product>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, name, tagline, status, image_url
        FROM products
        WHERE status = 'approved'
        ORDER BY name, id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query approved products: {}", e)))
}

/// Loads the criteria catalogue in display order.
pub async fn load_criteria(pool: &PgPool) -> Result<Vec<Criterion>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, name, description, type AS criterion_type, weight, max_value
        FROM criteria
        ORDER BY display_order, name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query criteria: {}", e)))
}

/// Loads a criterion by id.
pub async fn load_criterion(pool: &PgPool, criterion_id: Uuid) -> Result<Criterion, AppError> {
    let criterion: Option<Criterion> = sqlx::query_as(
        r#"
        SELECT id, name, description, type AS criterion_type, weight, max_value
        FROM criteria
        WHERE id = $1
        "#,
    )
    .bind(criterion_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query criterion: {}", e)))?;

    criterion.ok_or_else(|| AppError::NotFound(format!("Criterion not found: {}", criterion_id)))
}

/// Loads every submission row, for leaderboard computation.
pub async fn load_all_submissions(pool: &PgPool) -> Result<Vec<SubmissionRecord>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, judge_id, product_id, criterion_id, rating_value, boolean_value, text_value, created_at, updated_at
        FROM judge_submissions
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query submissions: {}", e)))
}

/// Loads every judge's submissions for one product.
pub async fn load_product_submissions(
    pool: &PgPool,
    product_id: Uuid,
) -> Result<Vec<SubmissionRecord>, AppError> {
    sqlx::query_as(
        r#"
        SELECT id, judge_id, product_id, criterion_id, rating_value, boolean_value, text_value, created_at, updated_at
        FROM judge_submissions
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query product submissions: {}", e)))
}

/// Loads the makers of a product in credit order.
pub async fn load_makers(pool: &PgPool, product_id: Uuid) -> Result<Vec<Person>, AppError> {
    sqlx::query_as(
        r#"
        SELECT p.id, p.full_name, p.avatar_url, p.twitter, p.linkedin, p.github, p.website
        FROM product_makers m
        JOIN profiles p ON p.id = m.profile_id
        WHERE m.product_id = $1
        ORDER BY m.position, p.full_name
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query makers: {}", e)))
}

/// Loads profiles of judges with at least one submission for a product.
///
/// Judges without a profile row are returned as bare ids so the certificate
/// can still credit them anonymously.
pub async fn load_participating_judges(
    pool: &PgPool,
    product_id: Uuid,
) -> Result<Vec<Person>, AppError> {
    sqlx::query_as(
        r#"
        SELECT j.judge_id AS id, p.full_name, p.avatar_url, p.twitter, p.linkedin, p.github, p.website
        FROM (SELECT DISTINCT judge_id FROM judge_submissions WHERE product_id = $1) j
        LEFT JOIN profiles p ON p.id = j.judge_id
        ORDER BY p.full_name NULLS LAST, j.judge_id
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query judges: {}", e)))
}
