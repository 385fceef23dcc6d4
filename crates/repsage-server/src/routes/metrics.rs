//! Metrics and semantic cache administration routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use tracing::error;

use crate::state::AppState;
use repsage_resolve::PerformanceMetrics;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics", get(get_metrics).delete(reset_metrics))
        .route("/semantic-cache", delete(clear_semantic_cache))
}

/// GET /api/metrics: performance counters since start or last reset.
async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<PerformanceMetrics> {
    Json(state.engine.metrics())
}

/// DELETE /api/metrics: zero all counters.
async fn reset_metrics(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.engine.reset_metrics();
    Json(serde_json::json!({ "reset": true }))
}

/// DELETE /api/semantic-cache: forget learned query mappings.
async fn clear_semantic_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.engine.clear_semantic_cache() {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "cleared": true }))),
        Err(e) => {
            error!("Failed to clear semantic cache: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "cleared": false, "error": e.to_string() })),
            )
        }
    }
}
