//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access; concrete implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! with `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Short URL storage, the system of record
//! - [`TokenRepository`] - API token authentication
//!
//! Both report failures through [`StoreError`], so callers can tell a
//! uniqueness violation apart from every other failure.

pub mod store_error;
pub mod token_repository;
pub mod url_repository;

pub use store_error::{StoreError, StoreResult};
pub use token_repository::{ApiToken, TokenRepository};
pub use url_repository::UrlRepository;

#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
