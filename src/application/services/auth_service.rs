//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::repositories::{ApiToken, StoreResult, TokenRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses the
/// same function when issuing tokens, so both sides must share the secret.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Each token belongs to one owner; authenticating a token yields the owner id
/// on whose behalf the request acts. Tokens are compared by keyed hash, so a
/// read-only copy of the database is not enough to forge one.
pub struct AuthService<R: TokenRepository + ?Sized = dyn TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Hashes a raw token with this service's signing secret.
    pub fn hash_token(&self, token: &str) -> String {
        hash_token(&self.signing_secret, token)
    }

    /// Authenticates a raw token and returns the id of its owner.
    ///
    /// On success the token's `last_used_at` is refreshed; a failure to do so
    /// is logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked,
    /// [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        let token_hash = self.hash_token(token);

        let Some(owner_id) = self.repository.find_owner(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(error = %e, "Failed to update token last_used_at");
        }

        Ok(owner_id)
    }

    /// Stores the hash of `token` so that it authenticates as `owner_id`.
    ///
    /// The raw token is never persisted. A token whose hash is already
    /// registered yields [`crate::domain::repositories::StoreError::UniqueViolation`].
    pub async fn register_token(
        &self,
        owner_id: Uuid,
        name: &str,
        token: &str,
    ) -> StoreResult<ApiToken> {
        let token_hash = self.hash_token(token);
        self.repository
            .create_token(owner_id, name, &token_hash)
            .await
    }
}
