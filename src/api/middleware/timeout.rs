//! Per-request deadline.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Fails a request with `408 Request Timeout` once `limit` has elapsed.
///
/// The handler future is dropped on expiry, so work waiting on the store or
/// the cache stops at its current await point.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/{code}", get(redirect_handler))
///     .layer(middleware::from_fn_with_state(Duration::from_secs(10), timeout::layer));
/// ```
pub async fn layer(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, %uri, timeout_ms = limit.as_millis() as u64, "Request timed out");
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({
                    "error": {
                        "code": "request_timeout",
                        "message": "Request timed out",
                        "details": {}
                    }
                })),
            )
                .into_response()
        }
    }
}
