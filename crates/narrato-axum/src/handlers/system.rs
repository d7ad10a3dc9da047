//! Liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// `GET /health`
///
/// `OK` while the synthesis backend is usable, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.jobs.is_stopped() {
        return (StatusCode::SERVICE_UNAVAILABLE, "STOPPED");
    }
    match state.jobs.backend_health() {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::debug!(error = %e, "Health check: backend unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "BACKEND UNAVAILABLE")
        }
    }
}
