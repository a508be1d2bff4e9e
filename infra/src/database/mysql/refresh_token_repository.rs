//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Only the SHA-256 of a token value is stored. Revocation is a conditional
//! `UPDATE` and rotation runs the conditional revoke and the insert of the
//! replacement inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use uuid::Uuid;

use ca_core::domain::entities::token::RefreshToken;
use ca_core::errors::DomainError;
use ca_core::repositories::RefreshTokenRepository;

use super::{is_unique_violation, store_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_hash, created_at, created_by_ip,
           expires_at, revoked_at, revoked_by_ip
    FROM refresh_tokens
"#;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let column = |name: &str, e: sqlx::Error| {
            DomainError::internal(format!("Failed to get {}: {}", name, e))
        };

        let id: String = row.try_get("id").map_err(|e| column("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| column("user_id", e))?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("Invalid token UUID: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::internal(format!("Invalid user UUID: {}", e)))?,
            token_hash: row.try_get("token_hash").map_err(|e| column("token_hash", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
            created_by_ip: row
                .try_get("created_by_ip")
                .map_err(|e| column("created_by_ip", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column("expires_at", e))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| column("revoked_at", e))?,
            revoked_by_ip: row
                .try_get("revoked_by_ip")
                .map_err(|e| column("revoked_by_ip", e))?,
        })
    }

    async fn insert<'e, E>(executor: E, token: &RefreshToken) -> Result<(), DomainError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, created_at, created_by_ip,
                expires_at, revoked_at, revoked_by_ip
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(&token.created_by_ip)
            .bind(token.expires_at)
            .bind(token.revoked_at)
            .bind(&token.revoked_by_ip)
            .execute(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Conflict {
                        message: "Token already exists".to_string(),
                    }
                } else {
                    store_error("Failed to save refresh token", e)
                }
            })?;

        Ok(())
    }

    /// Conditional revoke shared by `revoke_if_active` and `rotate`
    async fn revoke<'e, E>(
        executor: E,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked_at = ?, revoked_by_ip = ?
            WHERE token_hash = ? AND revoked_at IS NULL AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(by_ip)
            .bind(token_hash)
            .bind(at)
            .execute(executor)
            .await
            .map_err(|e| store_error("Failed to revoke refresh token", e))?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        Self::insert(&self.pool, &token).await?;
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find refresh token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to list user tokens", e))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_if_active(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError> {
        Self::revoke(&self.pool, token_hash, at, by_ip).await
    }

    async fn rotate(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin rotation", e))?;

        if !Self::revoke(&mut *tx, token_hash, at, by_ip).await? {
            tx.rollback()
                .await
                .map_err(|e| store_error("Failed to roll back rotation", e))?;
            return Ok(false);
        }

        // a failed insert drops `tx`, which rolls the revoke back
        Self::insert(&mut *tx, &replacement).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit rotation", e))?;

        Ok(true)
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<MySql>::new("DELETE FROM refresh_tokens WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete expired tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("Failed to count user tokens", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| DomainError::internal(format!("Failed to get total: {}", e)))?;

        Ok(total as usize)
    }
}
