//! Completion certificate endpoints.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use showcase_scoring::{
    overall_score, render_certificate, summarize_product, CertificateDocument, CertificateInput,
    CertificatePayload,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::queries::{
    load_criteria, load_makers, load_participating_judges, load_product, load_product_submissions,
};
use crate::state::AppState;

/// Verification record the certificate QR code resolves to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateVerificationResponse {
    pub certificate: CertificatePayload,
    /// Lowercase hex SHA-256 of the canonical certificate payload.
    pub fingerprint: String,
}

/// Creates the certificates router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products/{product_id}/certificate", get(get_certificate_html))
        .route("/certificates/{product_id}", get(verify_certificate))
        .with_state(state)
}

/// Latest completion of any judge's evaluation of the product.
async fn load_completed_at(pool: &PgPool, product_id: Uuid) -> Result<Option<DateTime<Utc>>, AppError> {
    let row: (Option<DateTime<Utc>>,) = sqlx::query_as(
        r#"
        SELECT MAX(updated_at)
        FROM judge_evaluation_status
        WHERE product_id = $1 AND status = 'completed'
        "#,
    )
    .bind(product_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to query completion date: {}", e)))?;

    Ok(row.0)
}

/// Assembles the certificate document for a judged, approved product.
async fn build_certificate(state: &AppState, product_id: Uuid) -> Result<CertificateDocument, AppError> {
    let pool = &state.pool;

    // Step 1: Only approved products that were actually judged get a certificate
    let product = load_product(pool, product_id).await?;
    if !product.is_approved() {
        return Err(AppError::NotFound(format!(
            "No certificate for product {}: product is {}",
            product_id, product.status
        )));
    }

    let submissions = load_product_submissions(pool, product_id).await?;
    if submissions.is_empty() {
        return Err(AppError::NotFound(format!(
            "No certificate for product {}: product has not been judged",
            product_id
        )));
    }

    // Step 2: Aggregate
    let criteria = load_criteria(pool).await?;
    let summary = summarize_product(product_id, &criteria, &submissions);
    let overall = overall_score(&summary);

    // Step 3: People and dates
    let makers = load_makers(pool, product_id).await?;
    let judges = load_participating_judges(pool, product_id).await?;
    let completed_on = load_completed_at(pool, product_id)
        .await?
        .or_else(|| submissions.iter().map(|s| s.updated_at).max())
        .unwrap_or_else(Utc::now)
        .date_naive();

    // Step 4: Render
    let document = render_certificate(&CertificateInput {
        program_name: state.config.program_name.clone(),
        completed_on,
        product,
        makers,
        criteria,
        summary,
        judges,
        overall_score: overall,
        verification_url: state.config.verification_url(product_id),
    })?;

    Ok(document)
}

/// Printable HTML certificate.
///
/// GET /api/v1/products/{product_id}/certificate
async fn get_certificate_html(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let document = build_certificate(&state, product_id).await?;
    let html = document
        .to_html()
        .map_err(|e| AppError::Internal(format!("Failed to render certificate: {}", e)))?;

    tracing::info!(product_id = %product_id, "Certificate rendered");
    Ok(Html(html))
}

/// Certificate payload and fingerprint for verification.
///
/// GET /api/v1/certificates/{product_id}
async fn verify_certificate(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CertificateVerificationResponse>, AppError> {
    let document = build_certificate(&state, product_id).await?;
    let fingerprint = document
        .fingerprint()
        .map_err(|e| AppError::Internal(format!("Failed to fingerprint certificate: {}", e)))?;

    Ok(Json(CertificateVerificationResponse {
        certificate: document.payload,
        fingerprint,
    }))
}
