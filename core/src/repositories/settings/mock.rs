//! Mock implementation of SettingsRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::setting::SettingEntry;
use crate::errors::DomainError;

use super::r#trait::SettingsRepository;

/// Mock settings repository for testing
#[derive(Clone, Default)]
pub struct MockSettingsRepository {
    entries: Arc<RwLock<HashMap<String, SettingEntry>>>,
    reads: Arc<AtomicUsize>,
}

impl MockSettingsRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Raw stored entry, bypassing the read counter
    pub async fn raw(&self, key: &str) -> Option<SettingEntry> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl SettingsRepository for MockSettingsRepository {
    async fn find(&self, key: &str) -> Result<Option<SettingEntry>, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn upsert(&self, entry: SettingEntry) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        if entries.get(&entry.key).map_or(false, |stored| stored.is_system) {
            return Ok(false);
        }
        let written = !entry.is_system;
        entries.insert(entry.key.clone(), entry);
        Ok(written)
    }

    async fn insert_if_absent(&self, entry: SettingEntry) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.key) {
            return Ok(false);
        }
        entries.insert(entry.key.clone(), entry);
        Ok(true)
    }
}
