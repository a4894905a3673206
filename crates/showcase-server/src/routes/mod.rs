//! API routes for the Showcase server.

pub mod assignments;
pub mod certificates;
pub mod criteria;
pub mod evaluations;
pub mod leaderboard;
pub mod roles;
pub mod submissions;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::db;
use crate::state::AppState;

/// Creates the main API router with all routes mounted.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes(state.clone()))
        .nest("/api/v1", api_v1_routes(state))
}

/// Liveness probe, outside the versioned API.
fn health_routes(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Creates the v1 API routes.
fn api_v1_routes(state: AppState) -> Router {
    Router::new()
        .merge(assignments::router(state.clone()))
        .merge(submissions::router(state.clone()))
        .merge(evaluations::router(state.clone()))
        .merge(leaderboard::router(state.clone()))
        .merge(certificates::router(state.clone()))
        .merge(criteria::router(state.clone()))
        .merge(roles::router(state))
}

/// GET /health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
