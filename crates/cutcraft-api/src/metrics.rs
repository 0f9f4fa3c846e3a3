//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "cutcraft_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cutcraft_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "cutcraft_http_requests_in_flight";

    pub const UPLOADS_TOTAL: &str = "cutcraft_uploads_total";
    pub const PROCESSING_STARTED_TOTAL: &str = "cutcraft_processing_started_total";
    pub const PROCESSING_COMPLETED_TOTAL: &str = "cutcraft_processing_completed_total";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "cutcraft_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted upload.
pub fn record_upload(plan: &str) {
    counter!(names::UPLOADS_TOTAL, "plan" => plan.to_string()).increment(1);
}

/// Record a processing start.
pub fn record_processing_started() {
    counter!(names::PROCESSING_STARTED_TOTAL).increment(1);
}

/// Record a completion observed on the read path.
pub fn record_processing_completed() {
    counter!(names::PROCESSING_COMPLETED_TOTAL).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    counter!(names::RATE_LIMIT_HITS_TOTAL, "endpoint" => endpoint.to_string()).increment(1);
}

/// Sanitize a path for metrics labels: collapse ids into placeholders.
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");

    let path = regex_lite::Regex::new(r"/(process|video|download)/[A-Za-z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/$1/:video_id");

    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
