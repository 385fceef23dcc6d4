//! HTTP route handlers.

pub mod metrics;
pub mod resolve;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(resolve::routes())
        .merge(metrics::routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use repsage_catalog::StaticCatalog;
    use repsage_core::RepSageConfig;
    use repsage_generate::NoopBackend;
    use repsage_resolve::ResolutionEngine;
    use repsage_store::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path) -> Arc<AppState> {
        let config = RepSageConfig::from_env(dir).unwrap();
        let engine = ResolutionEngine::new(
            Arc::new(StaticCatalog::with_seed()),
            Arc::new(NoopBackend),
            Arc::new(MemoryStore::new()),
            &config.engine,
        )
        .unwrap();
        Arc::new(AppState::new(config, engine))
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_resolve_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let (status, body) = call(app, Method::POST, "/api/resolve", Some(json!({"name": "Push_Up"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "exact");
        assert_eq!(body["matchKind"], "exact");
        assert_eq!(body["record"]["name"], "Push Up");
        assert!(body["record"]["visualRef"].is_string());
        assert!(body["elapsedMs"].is_number());
    }

    #[tokio::test]
    async fn test_metrics_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.engine.resolve_exercise("squat").await;

        let (status, body) = call(build_router(state.clone()), Method::GET, "/api/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalRequests"], 1);
        assert_eq!(body["tierUsageCounts"]["exact"], 1);

        let (status, _) = call(build_router(state.clone()), Method::DELETE, "/api/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.engine.metrics().total_requests, 0);
    }

    #[tokio::test]
    async fn test_clear_semantic_cache_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) = call(app, Method::DELETE, "/api/semantic-cache", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], true);
    }

    #[tokio::test]
    async fn test_health_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let (status, body) = call(app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["generatorAvailable"], false);
        assert_eq!(body["catalogSize"], 12);
    }
}
