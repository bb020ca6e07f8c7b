//! HTTP surface of the shortener.
//!
//! Public redirect and resolve endpoints live at the root router; everything
//! under `/api` requires a bearer token and is scoped to its owner.
//!
//! - [`dto`] - request and response bodies
//! - [`handlers`] - one handler per endpoint, thin wrappers over [`crate::application`]
//! - [`middleware`] - auth, rate limiting, timeouts, tracing
//! - [`routes`] - the owner-scoped `/api` routes

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
