//! Tests for the in-memory refresh token repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;
use crate::repositories::token::{MockRefreshTokenRepository, RefreshTokenRepository};

fn token_for(user_id: Uuid, value: &str) -> RefreshToken {
    RefreshToken::new(
        user_id,
        RefreshToken::hash(value),
        "127.0.0.1",
        Utc::now(),
        Duration::days(7),
    )
}

#[tokio::test]
async fn test_save_rejects_duplicate_hash() {
    let repo = MockRefreshTokenRepository::new();
    let user_id = Uuid::new_v4();

    repo.save(token_for(user_id, "a")).await.unwrap();
    let result = repo.save(token_for(user_id, "a")).await;

    assert!(matches!(result, Err(DomainError::Conflict { .. })));
}

#[tokio::test]
async fn test_list_for_user_is_newest_first() {
    let repo = MockRefreshTokenRepository::new();
    let user_id = Uuid::new_v4();

    let first = repo.save(token_for(user_id, "a")).await.unwrap();
    let second = repo.save(token_for(user_id, "b")).await.unwrap();
    repo.save(token_for(Uuid::new_v4(), "c")).await.unwrap();

    let listed = repo.list_for_user(user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert_eq!(repo.count_for_user(user_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_revoke_if_active_only_succeeds_once() {
    let repo = MockRefreshTokenRepository::new();
    let token = repo.save(token_for(Uuid::new_v4(), "a")).await.unwrap();
    let now = Utc::now();

    assert!(repo.revoke_if_active(&token.token_hash, now, "1.1.1.1").await.unwrap());
    assert!(!repo.revoke_if_active(&token.token_hash, now, "2.2.2.2").await.unwrap());
    assert!(!repo.revoke_if_active("unknown", now, "2.2.2.2").await.unwrap());

    let stored = repo.find_by_hash(&token.token_hash).await.unwrap().unwrap();
    assert_eq!(stored.revoked_by_ip.as_deref(), Some("1.1.1.1"));
}

#[tokio::test]
async fn test_rotate_is_all_or_nothing() {
    let repo = MockRefreshTokenRepository::new();
    let user_id = Uuid::new_v4();
    let presented = repo.save(token_for(user_id, "a")).await.unwrap();
    let now = Utc::now();

    repo.fail_next_rotation();
    let failed = repo
        .rotate(&presented.token_hash, now, "ip", token_for(user_id, "b"))
        .await;
    assert!(failed.is_err());
    assert_eq!(repo.all().await.len(), 1);
    assert!(repo.find_by_hash(&presented.token_hash).await.unwrap().unwrap().is_active());

    assert!(repo
        .rotate(&presented.token_hash, now, "ip", token_for(user_id, "b"))
        .await
        .unwrap());
    assert!(!repo
        .rotate(&presented.token_hash, now, "ip", token_for(user_id, "c"))
        .await
        .unwrap());

    assert_eq!(repo.all().await.len(), 2);
    assert!(repo.find_by_hash(&RefreshToken::hash("c")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_expired_and_by_ids() {
    let repo = MockRefreshTokenRepository::new();
    let user_id = Uuid::new_v4();

    let mut expired = token_for(user_id, "old");
    expired.expires_at = Utc::now() - Duration::seconds(1);
    repo.save(expired).await.unwrap();
    let live = repo.save(token_for(user_id, "new")).await.unwrap();

    assert_eq!(repo.delete_expired(Utc::now()).await.unwrap(), 1);
    assert_eq!(repo.delete_by_ids(&[live.id, Uuid::new_v4()]).await.unwrap(), 1);
    assert!(repo.all().await.is_empty());
}
