//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the cache capability, and give HTTP
//! handlers a small API that speaks in [`crate::error::AppError`].
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL creation, resolution, mutation and analytics
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
