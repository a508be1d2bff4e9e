//! MySQL implementation of the SettingsRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use ca_core::domain::entities::setting::SettingEntry;
use ca_core::errors::DomainError;
use ca_core::repositories::SettingsRepository;

use super::{is_unique_violation, store_error};

/// MySQL implementation of SettingsRepository
///
/// Values are stored exactly as handed over; protection of secret values
/// happens in the settings provider.
pub struct MySqlSettingsRepository {
    pool: MySqlPool,
}

impl MySqlSettingsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::mysql::MySqlRow) -> Result<SettingEntry, DomainError> {
        let column = |name: &str, e: sqlx::Error| {
            DomainError::internal(format!("Failed to get {}: {}", name, e))
        };

        Ok(SettingEntry {
            key: row.try_get("key").map_err(|e| column("key", e))?,
            value: row.try_get("value").map_err(|e| column("value", e))?,
            is_secret: row.try_get("is_secret").map_err(|e| column("is_secret", e))?,
            is_system: row.try_get("is_system").map_err(|e| column("is_system", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column("updated_at", e))?,
        })
    }
}

#[async_trait]
impl SettingsRepository for MySqlSettingsRepository {
    async fn find(&self, key: &str) -> Result<Option<SettingEntry>, DomainError> {
        let query = r#"
            SELECT `key`, value, is_secret, is_system, updated_at
            FROM settings
            WHERE `key` = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find setting", e))?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn upsert(&self, entry: SettingEntry) -> Result<bool, DomainError> {
        // system rows keep their stored value; is_system is only set on first insert
        let query = r#"
            INSERT INTO settings (`key`, value, is_secret, is_system, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                value = IF(is_system, value, VALUES(value)),
                is_secret = IF(is_system, is_secret, VALUES(is_secret)),
                updated_at = IF(is_system, updated_at, VALUES(updated_at))
        "#;

        sqlx::query(query)
            .bind(&entry.key)
            .bind(&entry.value)
            .bind(entry.is_secret)
            .bind(entry.is_system)
            .bind(entry.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to save setting", e))?;

        // is_system never flips back, so a system row here means the write was refused
        let is_system: bool = sqlx::query_scalar("SELECT is_system FROM settings WHERE `key` = ?")
            .bind(&entry.key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("Failed to check setting", e))?;

        Ok(!is_system)
    }

    async fn insert_if_absent(&self, entry: SettingEntry) -> Result<bool, DomainError> {
        let query = r#"
            INSERT INTO settings (`key`, value, is_secret, is_system, updated_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&entry.key)
            .bind(&entry.value)
            .bind(entry.is_secret)
            .bind(entry.is_system)
            .bind(entry.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(store_error("Failed to seed setting", e)),
        }
    }
}
