use sqlx::PgPool;
use std::sync::Arc;
use shortly::domain::repositories::{StoreError, TokenRepository};
use shortly::infrastructure::persistence::PgTokenRepository;
use uuid::Uuid;

#[sqlx::test]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let owner = Uuid::new_v4();

    let token = repo.create_token(owner, "test-token", "hash123").await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert_eq!(token.owner_id, owner);
    assert!(token.revoked_at.is_none());
}

#[sqlx::test]
async fn test_duplicate_hash_is_unique_violation(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let owner = Uuid::new_v4();

    repo.create_token(owner, "first", "samehash").await.unwrap();
    let err = repo.create_token(owner, "second", "samehash").await.unwrap_err();

    assert!(err.is_unique_violation());
}

#[sqlx::test]
async fn test_find_owner(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let owner = Uuid::new_v4();

    repo.create_token(owner, "valid-token", "validhash").await.unwrap();

    assert_eq!(repo.find_owner("validhash").await.unwrap(), Some(owner));
    assert_eq!(repo.find_owner("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
async fn test_revoked_token_has_no_owner(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token(Uuid::new_v4(), "revoked-token", "revokedhash")
        .await
        .unwrap();
    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.find_owner("revokedhash").await.unwrap(), None);
}

#[sqlx::test]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    let token = repo
        .create_token(Uuid::new_v4(), "update-token", "updatehash")
        .await
        .unwrap();

    repo.update_last_used("updatehash").await.unwrap();

    let found = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(found.last_used_at.is_some());
}

#[sqlx::test]
async fn test_list_and_find(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let owner = Uuid::new_v4();

    for (name, hash) in [("token1", "hash1"), ("token2", "hash2"), ("token3", "hash3")] {
        repo.create_token(owner, name, hash).await.unwrap();
    }

    assert_eq!(repo.list_tokens().await.unwrap().len(), 3);

    let by_name = repo.find_by_name("token2").await.unwrap().unwrap();
    assert_eq!(by_name.token_hash, "hash2");

    let by_id = repo.find_by_id(by_name.id).await.unwrap().unwrap();
    assert_eq!(by_id.name, "token2");

    assert!(repo.find_by_name("missing").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_revoke_already_revoked_is_not_found(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token(Uuid::new_v4(), "double-revoke", "doublehash")
        .await
        .unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(
        repo.revoke_token(token.id).await.unwrap_err(),
        StoreError::NotFound
    );
}
