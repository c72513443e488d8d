//! Liveness endpoint for load balancers.
//!
//! Lives under `/api` so the auth gate never redirects it.

use axum::http::StatusCode;

/// `GET /api/health`: 200 while the process is serving.
///
/// Does not touch the database.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
