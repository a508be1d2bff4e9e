//! Setting entries held by the external settings store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys of the settings read by the token lifecycle
pub mod setting_keys {
    /// Base64 HMAC key, at least 32 bytes once decoded (secret)
    pub const JWT_SECRET_KEY: &str = "jwt.secretKey";
    pub const JWT_ISSUER: &str = "jwt.issuer";
    pub const JWT_AUDIENCE: &str = "jwt.audience";
    pub const JWT_EXPIRES_IN_SECONDS: &str = "jwt.expiresInSeconds";
    pub const JWT_VALIDATE_ISSUER: &str = "jwt.validateIssuer";
    pub const JWT_VALIDATE_AUDIENCE: &str = "jwt.validateAudience";
    pub const JWT_CLOCK_SKEW_SECONDS: &str = "jwt.clockSkewSeconds";
    pub const REFRESH_TOKEN_EXPIRES_IN_DAYS: &str = "refreshToken.expiresInDays";
    pub const REFRESH_TOKEN_RETENTION_COUNT: &str = "refreshToken.retentionCount";
}

/// A key/value pair in the settings store
///
/// Secret values are stored protected; `value` then holds ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
    pub is_secret: bool,
    /// Seeded by the system; later `set` calls leave it untouched
    pub is_system: bool,
    pub updated_at: DateTime<Utc>,
}

impl SettingEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, is_secret: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_secret,
            is_system: false,
            updated_at: Utc::now(),
        }
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }
}
