use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};

use super::common::{fixture, sample_user, settings_provider, TEST_IP};
use crate::domain::entities::setting::setting_keys;
use crate::domain::entities::token::{claim_types, RefreshToken};
use crate::errors::DomainError;
use crate::repositories::{MockRefreshTokenRepository, RefreshTokenRepository};
use crate::services::token::{AccessTokenSettings, TokenIssuer, TokenValidator};

#[tokio::test]
async fn test_access_token_round_trip() {
    let fx = fixture().await;
    let user = sample_user();

    let token = fx.issuer.generate_access_token(&user).await.unwrap();
    let claims = fx.validator.validate_access_token(&token).await.unwrap().unwrap();

    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.username, "u1");
    assert_eq!(claims.roles, vec!["admin", "auditor"]);
    assert_eq!(claims.permission_list(), vec!["users.read", "users.write"]);
    assert_eq!(claims.claim(claim_types::ROLE).unwrap().value, "admin");
    assert_eq!(claims.iss, "CoreAccess");
    assert_eq!(claims.aud, "CoreAccess");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_each_access_token_has_a_fresh_token_id() {
    let fx = fixture().await;
    let user = sample_user();

    let first = fx.issuer.generate_access_token(&user).await.unwrap();
    let second = fx.issuer.generate_access_token(&user).await.unwrap();

    let first = fx.validator.validate_access_token(&first).await.unwrap().unwrap();
    let second = fx.validator.validate_access_token(&second).await.unwrap().unwrap();
    assert_ne!(first.token_id, second.token_id);
}

#[tokio::test]
async fn test_configured_lifetime_is_used() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::JWT_EXPIRES_IN_SECONDS, "900", false)
        .await
        .unwrap();

    let pair = fx.issuer.issue_pair(&sample_user(), TEST_IP).await.unwrap();
    let claims = fx
        .validator
        .validate_access_token(&pair.access_token)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(pair.expires_in, 900);
    assert_eq!(claims.exp - claims.iat, 900);
}

#[tokio::test]
async fn test_missing_signing_key_is_configuration_error() {
    let settings = settings_provider();
    let issuer = TokenIssuer::new(
        std::sync::Arc::new(MockRefreshTokenRepository::new()),
        settings,
    );

    let result = issuer.generate_access_token(&sample_user()).await;
    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}

#[tokio::test]
async fn test_short_signing_key_is_configuration_error() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::JWT_SECRET_KEY, &BASE64.encode([1u8; 16]), true)
        .await
        .unwrap();

    let issued = fx.issuer.generate_access_token(&sample_user()).await;
    assert!(matches!(issued, Err(DomainError::Configuration { .. })));

    let validated = fx.validator.validate_access_token("a.b.c").await;
    assert!(matches!(validated, Err(DomainError::Configuration { .. })));
}

#[tokio::test]
async fn test_refresh_token_is_stored_hashed() {
    let fx = fixture().await;
    let user = sample_user();

    let issued = fx.issuer.generate_refresh_token(&user, TEST_IP).await.unwrap();

    assert_eq!(issued.token.len(), 43);
    assert!(!issued.token.contains('='));
    assert!(!issued.token.contains('+') && !issued.token.contains('/'));

    let stored = fx.tokens.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token_hash, RefreshToken::hash(&issued.token));
    assert_ne!(stored[0].token_hash, issued.token);
    assert_eq!(stored[0].created_by_ip, TEST_IP);
    assert_eq!(stored[0].expires_at - stored[0].created_at, Duration::days(7));
    assert!(stored[0].is_active());
}

#[tokio::test]
async fn test_refresh_lifetime_setting() {
    let fx = fixture().await;
    fx.settings
        .set(setting_keys::REFRESH_TOKEN_EXPIRES_IN_DAYS, "30", false)
        .await
        .unwrap();

    let issued = fx
        .issuer
        .generate_refresh_token(&sample_user(), TEST_IP)
        .await
        .unwrap();

    assert_eq!(
        issued.record.expires_at - issued.record.created_at,
        Duration::days(30)
    );
}

#[tokio::test]
async fn test_issue_pair_persists_one_refresh_token() {
    let fx = fixture().await;
    let user = sample_user();

    let pair = fx.issuer.issue_pair(&user, TEST_IP).await.unwrap();

    assert_eq!(fx.tokens.count_for_user(user.id).await.unwrap(), 1);
    let record = fx.validator.validate_refresh_token(&pair.refresh_token).await.unwrap();
    assert_eq!(record.user_id, user.id);
    assert_eq!(record.expires_at, pair.refresh_expires_at);
}

#[tokio::test]
async fn test_minted_token_is_not_persisted() {
    let fx = fixture().await;
    let settings = AccessTokenSettings::load(&fx.settings).await.unwrap();
    let user = sample_user();

    let minted = TokenIssuer::<MockRefreshTokenRepository>::mint_refresh_token(
        &Default::default(),
        user.id,
        TEST_IP,
        Utc::now(),
    );

    assert!(fx.tokens.all().await.is_empty());
    assert_eq!(minted.record.token_hash, RefreshToken::hash(&minted.token));

    let signed = TokenIssuer::<MockRefreshTokenRepository>::sign_access_token(
        &settings,
        &user,
        Utc::now(),
    )
    .unwrap();
    assert!(TokenValidator::<MockRefreshTokenRepository>::verify_access_token(&settings, &signed)
        .is_some());
}
