//! Health check endpoint.

use axum::http::StatusCode;

/// Handler for GET / - fixed confirmation text for uptime checks.
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "callbridge is running")
}
