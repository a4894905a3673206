//! Leaderboard, product summary and CSV export endpoints.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use showcase_scoring::{
    aggregate::round2, compute_leaderboard, leaderboard_csv, overall_score, summarize_product,
    CriterionSummary, RankedProduct,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::queries::{load_all_submissions, load_approved_products, load_criteria, load_product, load_product_submissions};
use crate::state::AppState;

/// Ranked products.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub entries: Vec<RankedProduct>,
}

/// Per-criterion aggregate of one product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub criteria: Vec<CriterionSummary>,
    /// Weighted score on the 0..=10 scale.
    pub overall_score: f64,
    /// `overall_score` on the 0..=100 scale.
    pub score_percent: f64,
}

/// Creates the leaderboard router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/export.csv", get(export_leaderboard_csv))
        .route("/products/{product_id}/summary", get(get_product_summary))
        .with_state(state)
}

/// Computes the leaderboard from a fresh snapshot of the store.
///
/// Any failed read fails the whole computation.
pub(crate) async fn build_leaderboard(pool: &PgPool) -> Result<Vec<RankedProduct>, AppError> {
    let products = load_approved_products(pool).await?;
    let criteria = load_criteria(pool).await?;
    let submissions = load_all_submissions(pool).await?;
    Ok(compute_leaderboard(&products, &criteria, &submissions))
}

/// GET /api/v1/leaderboard
async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let entries = build_leaderboard(&state.pool).await?;
    tracing::debug!(count = entries.len(), "Leaderboard computed");
    Ok(Json(LeaderboardResponse { entries }))
}

/// GET /api/v1/leaderboard/export.csv
async fn export_leaderboard_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entries = build_leaderboard(&state.pool).await?;
    let csv = leaderboard_csv(&entries)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leaderboard.csv\"",
            ),
        ],
        csv,
    ))
}

/// GET /api/v1/products/{product_id}/summary
async fn get_product_summary(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductSummaryResponse>, AppError> {
    let pool = &state.pool;
    let product = load_product(pool, product_id).await?;
    let criteria = load_criteria(pool).await?;
    let submissions = load_product_submissions(pool, product_id).await?;

    let summary = summarize_product(product_id, &criteria, &submissions);
    let overall = overall_score(&summary);

    Ok(Json(ProductSummaryResponse {
        product_id,
        product_name: product.name,
        criteria: summary,
        overall_score: overall,
        score_percent: round2(overall * 10.0),
    }))
}
