//! Token settings read from the settings store

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use tracing::warn;

use crate::domain::entities::setting::setting_keys;
use crate::domain::entities::token::{
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_DAYS, DEFAULT_RETENTION_COUNT,
};
use crate::errors::{DomainError, DomainResult};
use crate::services::settings::SettingsProvider;

/// Issuer and audience used when the store does not set them
pub const DEFAULT_ISSUER: &str = "CoreAccess";
pub const DEFAULT_AUDIENCE: &str = "CoreAccess";

/// Upper bound on clock-skew tolerance for access-token validation
pub const MAX_CLOCK_SKEW_SECONDS: u64 = 30;

/// Minimum decoded length of the HMAC signing key (256 bits)
pub const MIN_SIGNING_KEY_LEN: usize = 32;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Signing material and policy for access tokens
#[derive(Clone)]
pub struct AccessTokenSettings {
    signing_key: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub validate_issuer: bool,
    pub validate_audience: bool,
    pub clock_skew_seconds: u64,
}

impl std::fmt::Debug for AccessTokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .field("validate_issuer", &self.validate_issuer)
            .field("validate_audience", &self.validate_audience)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .finish_non_exhaustive()
    }
}

impl AccessTokenSettings {
    /// Load access-token settings, failing when the signing key is unusable
    pub async fn load(settings: &SettingsProvider) -> DomainResult<Self> {
        let encoded = settings
            .get(setting_keys::JWT_SECRET_KEY)
            .await?
            .ok_or_else(|| {
                DomainError::configuration(format!("{} is not configured", setting_keys::JWT_SECRET_KEY))
            })?;
        let signing_key = decode_signing_key(&encoded)?;

        let ttl_seconds = positive_or_default(
            setting_keys::JWT_EXPIRES_IN_SECONDS,
            settings
                .get_parsed(setting_keys::JWT_EXPIRES_IN_SECONDS, DEFAULT_ACCESS_TOKEN_TTL_SECONDS)
                .await?,
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        );

        let clock_skew_seconds = settings
            .get_parsed(setting_keys::JWT_CLOCK_SKEW_SECONDS, MAX_CLOCK_SKEW_SECONDS)
            .await?
            .min(MAX_CLOCK_SKEW_SECONDS);

        Ok(Self {
            signing_key,
            issuer: settings.get_or(setting_keys::JWT_ISSUER, DEFAULT_ISSUER).await?,
            audience: settings.get_or(setting_keys::JWT_AUDIENCE, DEFAULT_AUDIENCE).await?,
            ttl: Duration::seconds(ttl_seconds),
            validate_issuer: settings.get_parsed(setting_keys::JWT_VALIDATE_ISSUER, true).await?,
            validate_audience: settings
                .get_parsed(setting_keys::JWT_VALIDATE_AUDIENCE, true)
                .await?,
            clock_skew_seconds,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        SIGNING_ALGORITHM
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.signing_key)
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.signing_key)
    }

    /// Validation rules for incoming access tokens
    pub fn validation(&self) -> Validation {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = self.clock_skew_seconds;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        if self.validate_issuer {
            validation.set_issuer(&[self.issuer.as_str()]);
        }
        if self.validate_audience {
            validation.set_audience(&[self.audience.as_str()]);
        } else {
            validation.validate_aud = false;
        }

        validation
    }
}

/// Lifetime and retention policy for refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTokenSettings {
    pub ttl: Duration,
    /// Unexpired tokens kept per user by the recycling policy
    pub retention_count: usize,
}

impl Default for RefreshTokenSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            retention_count: DEFAULT_RETENTION_COUNT,
        }
    }
}

impl RefreshTokenSettings {
    pub async fn load(settings: &SettingsProvider) -> DomainResult<Self> {
        let days = positive_or_default(
            setting_keys::REFRESH_TOKEN_EXPIRES_IN_DAYS,
            settings
                .get_parsed(setting_keys::REFRESH_TOKEN_EXPIRES_IN_DAYS, DEFAULT_REFRESH_TOKEN_TTL_DAYS)
                .await?,
            DEFAULT_REFRESH_TOKEN_TTL_DAYS,
        );

        let retention_count = settings
            .get_parsed(setting_keys::REFRESH_TOKEN_RETENTION_COUNT, DEFAULT_RETENTION_COUNT)
            .await?;
        let retention_count = if retention_count == 0 {
            warn!(
                key = setting_keys::REFRESH_TOKEN_RETENTION_COUNT,
                "Retention count must be at least 1, using default"
            );
            DEFAULT_RETENTION_COUNT
        } else {
            retention_count
        };

        Ok(Self {
            ttl: Duration::days(days),
            retention_count,
        })
    }
}

/// Everything the token services read from the settings store
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access: AccessTokenSettings,
    pub refresh: RefreshTokenSettings,
}

impl TokenSettings {
    pub async fn load(settings: &SettingsProvider) -> DomainResult<Self> {
        Ok(Self {
            access: AccessTokenSettings::load(settings).await?,
            refresh: RefreshTokenSettings::load(settings).await?,
        })
    }
}

/// Decode the Base64 `jwt.secretKey` and check its length
pub fn decode_signing_key(encoded: &str) -> DomainResult<Vec<u8>> {
    let key = BASE64.decode(encoded.trim()).map_err(|_| {
        DomainError::configuration(format!("{} is not valid Base64", setting_keys::JWT_SECRET_KEY))
    })?;

    if key.len() < MIN_SIGNING_KEY_LEN {
        return Err(DomainError::configuration(format!(
            "{} must decode to at least 256 bits",
            setting_keys::JWT_SECRET_KEY
        )));
    }

    Ok(key)
}

fn positive_or_default(key: &str, value: i64, default: i64) -> i64 {
    if value > 0 {
        value
    } else {
        warn!(key = key, "Setting must be positive, using default");
        default
    }
}
