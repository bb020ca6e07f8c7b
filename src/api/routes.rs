//! API route configuration.
//!
//! Routes returned by [`protected_routes`] require Bearer token authentication
//! via [`crate::api::middleware::auth`]; the caller attaches that layer.

use crate::api::handlers::{
    analytics_handler, create_url_handler, delete_url_handler, list_urls_handler,
    update_url_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Owner-scoped API routes.
///
/// # Endpoints
///
/// - `GET    /urls`              - List the caller's short URLs (paginated)
/// - `POST   /urls`              - Create a short URL
/// - `PATCH  /urls/{id}`         - Replace the destination of a short URL
/// - `DELETE /urls/{id}`         - Delete a short URL
/// - `GET    /analytics/{code}`  - Redirect count of a short URL
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_urls_handler).post(create_url_handler))
        .route(
            "/urls/{id}",
            patch(update_url_handler).delete(delete_url_handler),
        )
        .route("/analytics/{code}", get(analytics_handler))
}
