//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, CORS, rate limiting, request timeouts and
//! request tracing.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod timeout;
pub mod tracing;
