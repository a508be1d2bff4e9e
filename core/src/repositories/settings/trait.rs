//! Settings repository trait.

use async_trait::async_trait;

use crate::domain::entities::setting::SettingEntry;
use crate::errors::DomainError;

/// Raw access to the settings store
///
/// Values are returned exactly as stored; secret entries hold ciphertext.
/// Protection and caching are the job of `SettingsProvider`.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Find an entry by key
    async fn find(&self, key: &str) -> Result<Option<SettingEntry>, DomainError>;

    /// Insert or overwrite an entry
    ///
    /// The `is_system` check and the write are one step at the store. System
    /// entries are created through `insert_if_absent`, never through this call.
    ///
    /// # Returns
    /// * `Ok(true)` - Entry written
    /// * `Ok(false)` - The stored entry is a system entry, nothing written
    async fn upsert(&self, entry: SettingEntry) -> Result<bool, DomainError>;

    /// Insert an entry only if the key is absent
    ///
    /// # Returns
    /// * `Ok(true)` - Entry inserted
    /// * `Ok(false)` - Key already present, nothing written
    async fn insert_if_absent(&self, entry: SettingEntry) -> Result<bool, DomainError>;
}
