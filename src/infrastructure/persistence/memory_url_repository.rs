//! In-process implementation of the short URL repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{StoreError, StoreResult, UrlRepository};

/// Constraint name reported for duplicate codes, matching the PostgreSQL schema.
const SHORT_CODE_CONSTRAINT: &str = "short_urls_short_code_key";
const PRIMARY_KEY_CONSTRAINT: &str = "short_urls_pkey";

struct StoredUrl {
    seq: u64,
    url: ShortUrl,
}

/// Short URL store backed by concurrent hash maps.
///
/// Code uniqueness is enforced by claiming the code in the index under the
/// shard lock before the record is inserted. Lock order is always
/// `codes` before `urls`.
///
/// Data lives only as long as the process; used for tests and
/// `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    urls: DashMap<Uuid, StoredUrl>,
    codes: DashMap<String, Uuid>,
    next_seq: AtomicU64,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored short URLs.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn id_for_code(&self, short_code: &str) -> Option<Uuid> {
        self.codes.get(short_code).map(|id| *id)
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn save(&self, new_url: NewShortUrl) -> StoreResult<ShortUrl> {
        match self.codes.entry(new_url.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation {
                constraint: SHORT_CODE_CONSTRAINT.to_string(),
            }),
            Entry::Vacant(slot) => {
                if self.urls.contains_key(&new_url.id) {
                    return Err(StoreError::UniqueViolation {
                        constraint: PRIMARY_KEY_CONSTRAINT.to_string(),
                    });
                }

                let url = ShortUrl {
                    id: new_url.id,
                    owner_id: new_url.owner_id,
                    short_code: new_url.short_code,
                    long_url: new_url.long_url,
                    redirects: 0,
                    created_at: Utc::now(),
                    updated_at: None,
                };
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

                self.urls.insert(
                    url.id,
                    StoredUrl {
                        seq,
                        url: url.clone(),
                    },
                );
                slot.insert(url.id);

                Ok(url)
            }
        }
    }

    async fn exists_by_code(&self, short_code: &str) -> StoreResult<bool> {
        Ok(self.codes.contains_key(short_code))
    }

    async fn find_by_code(&self, short_code: &str) -> StoreResult<Option<ShortUrl>> {
        let Some(id) = self.id_for_code(short_code) else {
            return Ok(None);
        };

        Ok(self.urls.get(&id).map(|stored| stored.url.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ShortUrl>> {
        Ok(self.urls.get(&id).map(|stored| stored.url.clone()))
    }

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ShortUrl>> {
        let mut owned: Vec<(u64, ShortUrl)> = self
            .urls
            .iter()
            .filter(|stored| stored.url.is_owned_by(owner_id))
            .map(|stored| (stored.seq, stored.url.clone()))
            .collect();

        owned.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        Ok(owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(_, url)| url)
            .collect())
    }

    async fn update(&self, url: &ShortUrl) -> StoreResult<ShortUrl> {
        let mut stored = self.urls.get_mut(&url.id).ok_or(StoreError::NotFound)?;

        stored.url.long_url = url.long_url.clone();
        stored.url.updated_at = Some(Utc::now());

        Ok(stored.url.clone())
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()> {
        let (_, removed) = self
            .urls
            .remove_if(&id, |_, stored| stored.url.is_owned_by(owner_id))
            .ok_or(StoreError::NotFound)?;

        self.codes.remove(&removed.url.short_code);

        Ok(())
    }

    async fn increment_redirects(&self, short_code: &str) -> StoreResult<()> {
        let id = self.id_for_code(short_code).ok_or(StoreError::NotFound)?;
        let mut stored = self.urls.get_mut(&id).ok_or(StoreError::NotFound)?;

        stored.url.redirects += 1;
        stored.url.updated_at = Some(Utc::now());

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
