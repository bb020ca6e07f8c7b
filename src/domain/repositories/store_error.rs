//! Error taxonomy shared by all store implementations.

use thiserror::Error;

/// Failures reported by a store.
///
/// Implementations classify driver errors into these variants so callers
/// never need to inspect driver internals. In particular the short URL
/// creation path retries only on [`StoreError::UniqueViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// No record matched the given key.
    #[error("record not found")]
    NotFound,

    /// Any other storage failure.
    #[error("storage failure: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Returns true for uniqueness-constraint violations.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}
