use chrono::{Duration, Utc};
use uuid::Uuid;

use super::common::{fixture, sample_user, TEST_IP};
use crate::domain::entities::setting::setting_keys;
use crate::domain::entities::token::RefreshToken;
use crate::repositories::RefreshTokenRepository;
use crate::services::token::RecycleOutcome;

fn expired_token(user_id: Uuid, value: &str) -> RefreshToken {
    RefreshToken::new(
        user_id,
        RefreshToken::hash(value),
        TEST_IP,
        Utc::now() - Duration::days(10),
        Duration::days(7),
    )
}

#[tokio::test]
async fn test_store_is_bounded_to_the_newest_tokens() {
    let fx = fixture().await;
    let user = sample_user();

    let mut issued = Vec::new();
    for _ in 0..8 {
        issued.push(fx.issuer.generate_refresh_token(&user, TEST_IP).await.unwrap());
    }

    let stored = fx.tokens.list_for_user(user.id).await.unwrap();
    assert_eq!(stored.len(), 5);

    let expected: Vec<String> = issued[3..]
        .iter()
        .rev()
        .map(|t| t.record.token_hash.clone())
        .collect();
    let kept: Vec<String> = stored.iter().map(|t| t.token_hash.clone()).collect();
    assert_eq!(kept, expected);
}

#[tokio::test]
async fn test_expired_tokens_are_removed_first() {
    let fx = fixture().await;
    let user = sample_user();

    fx.tokens.save(expired_token(user.id, "old-1")).await.unwrap();
    fx.tokens.save(expired_token(user.id, "old-2")).await.unwrap();
    fx.issuer.generate_refresh_token(&user, TEST_IP).await.unwrap();

    let stored = fx.tokens.list_for_user(user.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_active());
}

#[tokio::test]
async fn test_recycle_outcome_counts() {
    let fx = fixture().await;
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    fx.tokens.save(expired_token(user_id, "old")).await.unwrap();
    for i in 0..4 {
        let token = RefreshToken::new(
            user_id,
            RefreshToken::hash(&format!("live-{}", i)),
            TEST_IP,
            now - Duration::minutes(10 - i),
            Duration::days(7),
        );
        fx.tokens.save(token).await.unwrap();
    }

    let outcome = fx
        .issuer
        .recycling()
        .recycle_with_cap(user_id, 3, now)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RecycleOutcome {
            expired_removed: 1,
            overflow_removed: 1,
            retained: 3,
        }
    );
    assert!(fx
        .tokens
        .find_by_hash(&RefreshToken::hash("live-0"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_recycling_leaves_other_users_alone() {
    let fx = fixture().await;
    let user = sample_user();
    let other = Uuid::new_v4();

    fx.tokens.save(expired_token(other, "theirs")).await.unwrap();
    for _ in 0..6 {
        fx.issuer.generate_refresh_token(&user, TEST_IP).await.unwrap();
    }

    assert_eq!(fx.tokens.count_for_user(other).await.unwrap(), 1);
    assert_eq!(fx.tokens.count_for_user(user.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_invalid_retention_count_falls_back_to_default() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::REFRESH_TOKEN_RETENTION_COUNT, "0", false)
        .await
        .unwrap();
    let user = sample_user();

    for _ in 0..7 {
        fx.issuer.generate_refresh_token(&user, TEST_IP).await.unwrap();
    }

    let outcome = fx.issuer.recycling().recycle(user.id).await.unwrap();
    assert_eq!(outcome.retained, 5);
    assert_eq!(outcome.overflow_removed, 0);
}

#[tokio::test]
async fn test_sweep_expired_covers_every_user() {
    let fx = fixture().await;

    fx.tokens.save(expired_token(Uuid::new_v4(), "a")).await.unwrap();
    fx.tokens.save(expired_token(Uuid::new_v4(), "b")).await.unwrap();
    fx.issuer
        .generate_refresh_token(&sample_user(), TEST_IP)
        .await
        .unwrap();

    assert_eq!(fx.issuer.recycling().sweep_expired().await.unwrap(), 2);
    assert_eq!(fx.tokens.all().await.len(), 1);
}

#[tokio::test]
async fn test_recycle_uses_configured_retention_count() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::REFRESH_TOKEN_RETENTION_COUNT, "2", false)
        .await
        .unwrap();
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    for i in 0..4 {
        let token = RefreshToken::new(
            user_id,
            RefreshToken::hash(&format!("tok-{}", i)),
            TEST_IP,
            now - Duration::minutes(10 - i),
            Duration::days(7),
        );
        fx.tokens.save(token).await.unwrap();
    }

    let outcome = fx.issuer.recycling().recycle(user_id).await.unwrap();
    assert_eq!(
        outcome,
        RecycleOutcome {
            expired_removed: 0,
            overflow_removed: 2,
            retained: 2,
        }
    );

    let kept: Vec<String> = fx
        .tokens
        .list_for_user(user_id)
        .await
        .unwrap()
        .iter()
        .map(|t| t.token_hash.clone())
        .collect();
    assert_eq!(
        kept,
        vec![RefreshToken::hash("tok-3"), RefreshToken::hash("tok-2")]
    );
}
