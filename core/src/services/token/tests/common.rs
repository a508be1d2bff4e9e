use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::domain::entities::setting::setting_keys;
use crate::domain::entities::user::{Role, User};
use crate::repositories::{MockRefreshTokenRepository, MockSettingsRepository, MockUserRepository};
use crate::services::protection::AesGcmSecretProtector;
use crate::services::settings::SettingsProvider;
use crate::services::token::{TokenIssuer, TokenRotation, TokenValidator};

pub const TEST_IP: &str = "203.0.113.7";

pub struct Fixture {
    pub tokens: Arc<MockRefreshTokenRepository>,
    pub users: Arc<MockUserRepository>,
    pub settings: Arc<SettingsProvider>,
    pub issuer: TokenIssuer<MockRefreshTokenRepository>,
    pub validator: TokenValidator<MockRefreshTokenRepository>,
    pub rotation: TokenRotation<MockRefreshTokenRepository, MockUserRepository>,
}

pub fn signing_key() -> String {
    BASE64.encode([42u8; 32])
}

pub fn settings_provider() -> Arc<SettingsProvider> {
    let protector = AesGcmSecretProtector::new(&[1u8; 32]).unwrap();
    Arc::new(SettingsProvider::new(
        Arc::new(MockSettingsRepository::new()),
        Arc::new(protector),
        Duration::from_secs(300),
    ))
}

/// Wires the token services over empty in-memory stores with a signing key set
pub async fn fixture() -> Fixture {
    let settings = settings_provider();
    settings
        .set(setting_keys::JWT_SECRET_KEY, &signing_key(), true)
        .await
        .unwrap();

    let tokens = Arc::new(MockRefreshTokenRepository::new());
    let users = Arc::new(MockUserRepository::new());
    let issuer = TokenIssuer::new(Arc::clone(&tokens), Arc::clone(&settings));
    let validator = TokenValidator::new(Arc::clone(&tokens), Arc::clone(&settings));
    let rotation = TokenRotation::new(issuer.clone(), validator.clone(), Arc::clone(&users));

    Fixture {
        tokens,
        users,
        settings,
        issuer,
        validator,
        rotation,
    }
}

pub fn sample_user() -> User {
    User::new("u1", "unused").with_roles(vec![
        Role::new("admin").with_permissions(["users.read", "users.write"]),
        Role::new("auditor").with_permissions(["users.read"]),
    ])
}
