use std::sync::Arc;

use super::common::{fixture, sample_user, TEST_IP};
use crate::domain::entities::setting::setting_keys;
use crate::errors::{DomainError, ErrorKind};
use crate::repositories::RefreshTokenRepository;
use crate::domain::entities::token::RefreshToken;

#[tokio::test]
async fn test_login_refresh_replay_scenario() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;

    let (at1, rt1) = {
        let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();
        (pair.access_token, pair.refresh_token)
    };

    let second = fx.rotation.refresh(&rt1, TEST_IP).await.unwrap();
    assert_ne!(second.access_token, at1);
    assert_ne!(second.refresh_token, rt1);

    let old = fx
        .tokens
        .find_by_hash(&RefreshToken::hash(&rt1))
        .await
        .unwrap()
        .unwrap();
    assert!(old.is_revoked());
    assert_eq!(old.revoked_by_ip.as_deref(), Some(TEST_IP));

    let replay = fx.rotation.refresh(&rt1, TEST_IP).await.unwrap_err();
    assert_eq!(replay, DomainError::invalid_refresh_token());

    let third = fx.rotation.refresh(&second.refresh_token, TEST_IP).await.unwrap();
    let claims = fx
        .validator
        .validate_access_token(&third.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(third.expires_in, 3600);
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    let (first, second) = tokio::join!(
        fx.rotation.refresh(&pair.refresh_token, "10.0.0.1"),
        fx.rotation.refresh(&pair.refresh_token, "10.0.0.2"),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.kind(), ErrorKind::Unauthorized);

    let active: Vec<_> = fx
        .tokens
        .list_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.is_active())
        .collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_rotation_across_threads_has_one_winner() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    let rotation = Arc::new(fx.rotation);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let rotation = Arc::clone(&rotation);
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            rotation.refresh(&token, TEST_IP).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e, DomainError::invalid_refresh_token()),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_failed_rotation_writes_nothing() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    fx.tokens.fail_next_rotation();
    let error = fx.rotation.refresh(&pair.refresh_token, TEST_IP).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Internal);

    let stored = fx.tokens.all().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_active());

    assert!(fx.rotation.refresh(&pair.refresh_token, TEST_IP).await.is_ok());
}

#[tokio::test]
async fn test_deleted_owner_is_unauthorized() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    fx.users.remove(user.id).await;

    let error = fx.rotation.refresh(&pair.refresh_token, TEST_IP).await.unwrap_err();
    assert_eq!(error, DomainError::invalid_refresh_token());
    assert!(fx.tokens.all().await[0].is_active());
}

#[tokio::test]
async fn test_disabled_owner_is_unauthorized() {
    let fx = fixture().await;
    let mut user = sample_user();
    user.is_active = false;
    let user = fx.users.insert(user).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    let error = fx.rotation.refresh(&pair.refresh_token, TEST_IP).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_rotation_recycles_the_users_tokens() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::REFRESH_TOKEN_RETENTION_COUNT, "2", false)
        .await
        .unwrap();
    let user = fx.users.insert(sample_user()).await;

    let mut current = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap().refresh_token;
    for _ in 0..3 {
        current = fx.rotation.refresh(&current, TEST_IP).await.unwrap().refresh_token;
    }

    let stored = fx.tokens.list_for_user(user.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].token_hash, RefreshToken::hash(&current));
    assert!(stored[0].is_active());
    assert!(stored[1].is_revoked());
}

#[tokio::test]
async fn test_logout_revokes_without_reissuing() {
    let fx = fixture().await;
    let user = fx.users.insert(sample_user()).await;
    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    fx.rotation.logout(&pair.refresh_token, "198.51.100.1").await.unwrap();

    let stored = fx.tokens.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].revoked_by_ip.as_deref(), Some("198.51.100.1"));

    let again = fx.rotation.logout(&pair.refresh_token, TEST_IP).await.unwrap_err();
    let refresh = fx.rotation.refresh(&pair.refresh_token, TEST_IP).await.unwrap_err();
    let unknown = fx.rotation.logout("never-issued", TEST_IP).await.unwrap_err();

    assert_eq!(again, DomainError::invalid_refresh_token());
    assert_eq!(refresh, again);
    assert_eq!(unknown, again);
}
