//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::account::{billing_history, get_profile, signup, upgrade};
use crate::handlers::health::{health, ready};
use crate::handlers::videos::{
    download_video, list_videos, start_processing, upload_video, video_status,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Fixed prefix every API route lives under.
pub const API_PREFIX: &str = "/api/v1";

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let account_routes = Router::new()
        .route("/signup", post(signup))
        .route("/profile", get(get_profile))
        .route("/upgrade", post(upgrade))
        .route("/billing", get(billing_history));

    let video_routes = Router::new()
        .route("/upload", post(upload_video))
        .route("/process/:video_id", post(start_processing))
        .route("/video/:video_id", get(video_status))
        .route("/download/:video_id", get(download_video))
        .route("/videos", get(list_videos));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(account_routes)
        .merge(video_routes)
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    // Root-level probes for infrastructure
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest(API_PREFIX, api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Body cap sized for the largest plan ceiling
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
