//! In-process implementation of the token repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

use crate::domain::repositories::{ApiToken, StoreError, StoreResult, TokenRepository};

/// Token store keyed by token hash.
///
/// Pairs with [`super::InMemoryUrlRepository`] for `STORAGE_BACKEND=memory`
/// and for HTTP tests.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: DashMap<String, ApiToken>,
    next_id: AtomicI64,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find_owner(&self, token_hash: &str) -> StoreResult<Option<Uuid>> {
        Ok(self
            .tokens
            .get(token_hash)
            .filter(|token| token.revoked_at.is_none())
            .map(|token| token.owner_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> StoreResult<()> {
        if let Some(mut token) = self.tokens.get_mut(token_hash)
            && token.revoked_at.is_none()
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        owner_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> StoreResult<ApiToken> {
        match self.tokens.entry(token_hash.to_string()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation {
                constraint: "api_tokens_token_hash_key".to_string(),
            }),
            Entry::Vacant(slot) => {
                let token = ApiToken {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    owner_id,
                    name: name.to_string(),
                    token_hash: token_hash.to_string(),
                    created_at: Utc::now(),
                    last_used_at: None,
                    revoked_at: None,
                };
                slot.insert(token.clone());
                Ok(token)
            }
        }
    }

    async fn list_tokens(&self) -> StoreResult<Vec<ApiToken>> {
        let mut tokens: Vec<ApiToken> = self.tokens.iter().map(|t| t.value().clone()).collect();
        tokens.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<ApiToken>> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<ApiToken>> {
        Ok(self
            .tokens
            .iter()
            .filter(|t| t.name == name)
            .max_by_key(|t| t.id)
            .map(|t| t.value().clone()))
    }

    async fn revoke_token(&self, id: i64) -> StoreResult<()> {
        let mut token = self
            .tokens
            .iter_mut()
            .find(|t| t.id == id && t.revoked_at.is_none())
            .ok_or(StoreError::NotFound)?;

        token.revoked_at = Some(Utc::now());
        Ok(())
    }
}
