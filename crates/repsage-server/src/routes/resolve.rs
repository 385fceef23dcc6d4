//! Resolution routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use repsage_core::MatchResult;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/resolve", post(resolve))
        .route("/health", get(health))
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    #[serde(default)]
    name: String,
}

/// POST /api/resolve: resolve one exercise name. Always 200.
async fn resolve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> Json<MatchResult> {
    Json(state.engine.resolve_exercise(&req.name).await)
}

/// GET /api/health: liveness plus collaborator status.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "generatorAvailable": state.engine.generator_available(),
        "catalogSize": state.engine.catalog_size(),
        "semanticCacheEntries": state.engine.semantic_cache_len(),
        "port": state.config.port,
    }))
}
