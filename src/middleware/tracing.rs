// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Builds per-request spans keyed by x-request-id and logs completed requests

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;

use crate::logging::AppLogger;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create a tracing span for an HTTP request
///
/// The request id is set by the request-id layer before this runs; the user
/// id is recorded later by the auth extractor.
#[must_use]
pub fn create_request_span<B>(request: &http::Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
        status_code = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}

/// Log every completed request with its status and latency
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;
    let span = Span::current();
    span.record("status_code", status);
    span.record("duration_ms", duration_ms);
    AppLogger::log_api_request(method.as_str(), &path, status, duration_ms);

    response
}
