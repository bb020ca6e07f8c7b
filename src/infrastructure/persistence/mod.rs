//! Store implementations.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL short URL storage
//! - [`PgTokenRepository`] - PostgreSQL API token storage and validation
//! - [`InMemoryUrlRepository`] - Process-local short URL storage
//! - [`InMemoryTokenRepository`] - Process-local API token storage
//!
//! Driver errors are classified into [`StoreError`] here, so nothing above this
//! module ever inspects a `sqlx::Error`.

pub mod memory_token_repository;
pub mod memory_url_repository;
pub mod pg_token_repository;
pub mod pg_url_repository;

pub use memory_token_repository::InMemoryTokenRepository;
pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_url_repository::PgUrlRepository;

use crate::domain::repositories::StoreError;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return StoreError::UniqueViolation {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            };
        }

        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Internal(other.to_string()),
        }
    }
}
