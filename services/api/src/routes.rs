use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use jobmatch::auth::{require_bearer, TokenVerifier};
use jobmatch::workflows::matching::{
    matching_router, ApplicationStore, JobCatalog, MatchingService, ShortlistStore, UserDirectory,
};
use serde_json::json;
use std::sync::Arc;

/// Compose the authenticated workflow routes with the unauthenticated
/// health, readiness, and metrics endpoints.
pub(crate) fn with_matching_routes<C, U, S, A, V>(
    service: Arc<MatchingService<C, U, S, A>>,
    verifier: Arc<V>,
) -> Router
where
    C: JobCatalog + 'static,
    U: UserDirectory + 'static,
    S: ShortlistStore + 'static,
    A: ApplicationStore + 'static,
    V: TokenVerifier + 'static,
{
    matching_router(service)
        .route_layer(from_fn_with_state(verifier, require_bearer::<V>))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
