#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use ca_api::AppState;
use ca_core::domain::{setting_keys, Role, User};
use ca_core::repositories::{MockRefreshTokenRepository, MockSettingsRepository, MockUserRepository};
use ca_core::services::{AesGcmSecretProtector, SettingsProvider};

pub const PASSWORD: &str = "correct horse battery staple";

pub type TestState = AppState<MockUserRepository, MockRefreshTokenRepository>;

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub users: Arc<MockUserRepository>,
    pub tokens: Arc<MockRefreshTokenRepository>,
    pub user: User,
}

/// App state over in-memory stores with a signing key and one active user
pub async fn context() -> TestContext {
    let settings = Arc::new(SettingsProvider::new(
        Arc::new(MockSettingsRepository::new()),
        Arc::new(AesGcmSecretProtector::new(&[7u8; 32]).unwrap()),
        Duration::from_secs(300),
    ));
    settings
        .set(setting_keys::JWT_SECRET_KEY, &BASE64.encode([9u8; 32]), true)
        .await
        .unwrap();

    let users = Arc::new(MockUserRepository::new());
    let tokens = Arc::new(MockRefreshTokenRepository::new());

    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    let user = users
        .insert(User::new("u1", hash).with_roles(vec![
            Role::new("admin").with_permissions(["users.read", "users.write"]),
        ]))
        .await;

    let state = web::Data::new(AppState::new(
        Arc::clone(&users),
        Arc::clone(&tokens),
        settings,
    ));

    TestContext {
        state,
        users,
        tokens,
        user,
    }
}
