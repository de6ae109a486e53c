//! Request interceptor.
//!
//! Runs once per request, before handler dispatch. Documentation endpoints
//! are passed through untouched; every other request is recorded to the
//! access log (when enabled) before the rest of the pipeline runs.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::middleware::access_log;
use crate::state::AppState;

/// Paths exempt from pre-processing: the documentation UI, the
/// machine-readable schema, and the alternate docs UI.
pub const BYPASS_PATHS: &[&str] = &["/docs", "/openapi.json", "/redoc"];

/// Middleware wrapping the rest of the pipeline.
///
/// Never blocks the pipeline and never touches the response: whatever the
/// downstream stage produces (or fails with) is returned unchanged. The
/// access-log call is the only side effect.
pub async fn intercept_request(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if BYPASS_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let request = if state.access_log_enabled() {
        access_log::record_request(&state, request).await
    } else {
        request
    };

    next.run(request).await
}
