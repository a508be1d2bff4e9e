use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use tracing::{error, info, warn};

use ca_api::{create_app, telemetry::init_tracing, AppState};
use ca_core::domain::setting_keys;
use ca_core::services::{AesGcmSecretProtector, RecyclingPolicy, SettingsProvider};
use ca_infra::{
    load_or_create_key, DatabasePool, MySqlRefreshTokenRepository, MySqlSettingsRepository,
    MySqlUserRepository,
};
use ca_shared::AppConfig;

/// Length of the signing key generated on first start
const GENERATED_SIGNING_KEY_BYTES: usize = 64;

/// How often expired refresh tokens are purged
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting CoreAccess API server");

    let pool = DatabasePool::new(&config.database).await?;
    info!("{}", pool.get_statistics());

    let protection_key = load_or_create_key(&config.settings.protection_key_path)?;
    let protector = AesGcmSecretProtector::new(&protection_key)?;

    let settings = Arc::new(SettingsProvider::new(
        Arc::new(MySqlSettingsRepository::new(pool.get_pool().clone())),
        Arc::new(protector),
        config.settings.cache_ttl(),
    ));
    seed_signing_key(&settings).await?;

    let state = web::Data::new(AppState::new(
        Arc::new(MySqlUserRepository::new(pool.get_pool().clone())),
        Arc::new(MySqlRefreshTokenRepository::new(pool.get_pool().clone())),
        settings,
    ));

    actix_web::rt::spawn(sweep_expired_tokens(state.recycling.clone()));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let cors = config.server.cors.clone();
    if config.environment.is_production() && cors.allowed_origins.is_empty() {
        warn!("No CORS origins configured; any origin is allowed");
    }
    let mut server = HttpServer::new(move || create_app(state.clone(), &cors));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    pool.close().await;
    Ok(())
}

/// Generate a signing key on first start; an existing key is never replaced
async fn seed_signing_key(settings: &SettingsProvider) -> anyhow::Result<()> {
    let mut key = vec![0u8; GENERATED_SIGNING_KEY_BYTES];
    OsRng.fill_bytes(&mut key);

    if settings
        .seed_system(setting_keys::JWT_SECRET_KEY, &BASE64.encode(&key), true)
        .await?
    {
        info!("Generated a new access token signing key");
    }
    Ok(())
}

async fn sweep_expired_tokens(recycling: RecyclingPolicy<MySqlRefreshTokenRepository>) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = recycling.sweep_expired().await {
            error!("Expired refresh token sweep failed: {}", e);
        }
    }
}
