//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "reel_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "reel_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "reel_http_requests_in_flight";

    // Upload metrics
    pub const UPLOADS_ACCEPTED_TOTAL: &str = "reel_uploads_accepted_total";
    pub const UPLOADS_REJECTED_TOTAL: &str = "reel_uploads_rejected_total";

    // Export metrics
    pub const EXPORTS_TOTAL: &str = "reel_exports_total";
    pub const EXPORTS_FAILED_TOTAL: &str = "reel_exports_failed_total";
    pub const EXPORT_FRAMES: &str = "reel_export_frames";
    pub const FFMPEG_DURATION_SECONDS: &str = "reel_ffmpeg_duration_seconds";

    // Session metrics
    pub const SESSIONS_ACTIVE: &str = "reel_sessions_active";
    pub const SESSIONS_SWEPT_TOTAL: &str = "reel_sessions_swept_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "reel_rate_limit_hits_total";
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

/// Record upload validation outcomes.
pub fn record_uploads(accepted: usize, rejected: usize) {
    counter!(names::UPLOADS_ACCEPTED_TOTAL).increment(accepted as u64);
    counter!(names::UPLOADS_REJECTED_TOTAL).increment(rejected as u64);
}

/// Record a completed export.
pub fn record_export(preset: &str, frame_count: usize) {
    let labels = [("preset", preset.to_string())];
    counter!(names::EXPORTS_TOTAL, &labels).increment(1);
    histogram!(names::EXPORT_FRAMES).record(frame_count as f64);
}

/// Record a failed export.
pub fn record_export_failed(preset: &str) {
    let labels = [("preset", preset.to_string())];
    counter!(names::EXPORTS_FAILED_TOTAL, &labels).increment(1);
}

/// Update active sessions gauge.
pub fn set_active_sessions(count: usize) {
    gauge!(names::SESSIONS_ACTIVE).set(count as f64);
}

/// Record sessions removed by the sweeper.
pub fn record_sessions_swept(count: usize) {
    counter!(names::SESSIONS_SWEPT_TOTAL).increment(count as u64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    let path = regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(&path, "/:id$1");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/sessions/550e8400-e29b-41d4-a716-446655440000"),
            "/api/sessions/:id"
        );
        assert_eq!(
            sanitize_path(
                "/api/sessions/550e8400-e29b-41d4-a716-446655440000/artifacts/11111111-2222-3333-4444-555555555555/download"
            ),
            "/api/sessions/:id/artifacts/:id/download"
        );
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
