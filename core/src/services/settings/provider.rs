//! Per-instance settings cache over a `SettingsRepository`

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::entities::setting::SettingEntry;
use crate::errors::DomainResult;
use crate::repositories::SettingsRepository;
use crate::services::protection::SecretProtector;

/// How long a loaded value is served from the cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedValue {
    /// Plaintext, `None` when the key is absent from the store
    value: Option<String>,
    loaded_at: Instant,
}

/// Cached values plus the counters that fence out stale fills
///
/// `invalidate` bumps the key's generation and `reload` bumps the epoch. A
/// load only lands in the cache if neither moved while it was reading.
#[derive(Debug, Default)]
struct Cache {
    entries: HashMap<String, CachedValue>,
    generations: HashMap<String, u64>,
    epoch: u64,
}

impl Cache {
    fn stamp(&self, key: &str) -> (u64, u64) {
        (self.epoch, self.generations.get(key).copied().unwrap_or(0))
    }
}

/// Configuration provider injected into the token services
///
/// Secret entries are decrypted on load and only their plaintext is cached.
/// Every write through this provider drops the cached value for that key, so
/// the next read goes back to the store.
pub struct SettingsProvider {
    repository: Arc<dyn SettingsRepository>,
    protector: Arc<dyn SecretProtector>,
    cache: RwLock<Cache>,
    ttl: Duration,
}

impl SettingsProvider {
    pub fn new(
        repository: Arc<dyn SettingsRepository>,
        protector: Arc<dyn SecretProtector>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            protector,
            cache: RwLock::new(Cache::default()),
            ttl,
        }
    }

    /// Plaintext value of a setting, `None` when unset
    ///
    /// A write or reload that happens while the store read is in flight wins:
    /// the loaded value is returned to this caller but not cached.
    pub async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let stamp = {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.entries.get(key) {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(cached.value.clone());
                }
            }
            cache.stamp(key)
        };

        let value = match self.repository.find(key).await? {
            Some(entry) if entry.is_secret => Some(self.protector.unprotect(&entry.value)?),
            Some(entry) => Some(entry.value),
            None => None,
        };

        debug!(key = key, present = value.is_some(), "Setting loaded from store");

        let mut cache = self.cache.write().await;
        if cache.stamp(key) == stamp {
            cache.entries.insert(
                key.to_string(),
                CachedValue {
                    value: value.clone(),
                    loaded_at: Instant::now(),
                },
            );
        } else {
            debug!(key = key, "Setting changed during load, not caching");
        }

        Ok(value)
    }

    /// Value of a setting, or `default` when unset or blank
    pub async fn get_or(&self, key: &str, default: &str) -> DomainResult<String> {
        Ok(self
            .get(key)
            .await?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// Parsed value of a setting
    ///
    /// Unset settings yield `default`. A value that does not parse also yields
    /// `default` and is reported at `warn`.
    pub async fn get_parsed<T>(&self, key: &str, default: T) -> DomainResult<T>
    where
        T: FromStr,
    {
        let raw = match self.get(key).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(key = key, "Setting has an invalid value, using default");
                Ok(default)
            }
        }
    }

    /// Write a setting, protecting it first when `is_secret`
    ///
    /// # Returns
    /// * `Ok(true)` - Value written and cache entry dropped
    /// * `Ok(false)` - The stored entry is system-seeded; nothing written
    pub async fn set(&self, key: &str, value: &str, is_secret: bool) -> DomainResult<bool> {
        let stored = self.stored_value(value, is_secret)?;
        let written = self
            .repository
            .upsert(SettingEntry::new(key, stored, is_secret))
            .await?;

        if !written {
            warn!(key = key, "Refusing to overwrite system setting");
            return Ok(false);
        }

        self.invalidate(key).await;
        Ok(true)
    }

    /// Seed a system entry if the key is absent
    ///
    /// Returns whether the entry was written.
    pub async fn seed_system(&self, key: &str, value: &str, is_secret: bool) -> DomainResult<bool> {
        let stored = self.stored_value(value, is_secret)?;
        let inserted = self
            .repository
            .insert_if_absent(SettingEntry::new(key, stored, is_secret).system())
            .await?;

        if inserted {
            self.invalidate(key).await;
        }

        Ok(inserted)
    }

    /// Drop the cached value for one key
    pub async fn invalidate(&self, key: &str) {
        let mut cache = self.cache.write().await;
        cache.entries.remove(key);
        *cache.generations.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Drop every cached value
    pub async fn reload(&self) {
        let mut cache = self.cache.write().await;
        cache.entries.clear();
        cache.generations.clear();
        cache.epoch += 1;
    }

    fn stored_value(&self, value: &str, is_secret: bool) -> DomainResult<String> {
        if is_secret {
            self.protector.protect(value)
        } else {
            Ok(value.to_string())
        }
    }
}
