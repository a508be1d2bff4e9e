//! Settings-store access configuration
//!
//! Token signing material and token lifetimes live in the settings store, not
//! in process configuration. This section only tells the process how to reach
//! and decrypt that store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the settings provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsConfig {
    /// How long a decrypted setting stays in the in-process cache
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// File holding the Base64 key used to protect secret settings at rest
    #[serde(default = "default_protection_key_path")]
    pub protection_key_path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            protection_key_path: default_protection_key_path(),
        }
    }
}

impl SettingsConfig {
    /// Cache lifetime as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_protection_key_path() -> String {
    String::from("keys/settings.key")
}
