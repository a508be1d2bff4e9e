//! Refresh token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for refresh token persistence
///
/// Records are keyed by `token_hash` and secondarily indexed by `user_id`.
/// A stored record is only ever mutated to set `revoked_at`/`revoked_by_ip`,
/// and that mutation is always conditional on the record still being active.
///
/// # Security Considerations
/// - Only the SHA-256 of a token value is stored
/// - `revoke_if_active` and `rotate` must be atomic at the store; two callers
///   presenting the same token must never both observe `true`
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError::Conflict)` - A token with the same hash exists
    /// * `Err(DomainError::Internal)` - Store failure
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by the hash of its value
    ///
    /// Returns revoked and expired records as well; callers decide.
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// All refresh tokens owned by a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Revoke a token only if it is still active at `at`
    ///
    /// # Returns
    /// * `Ok(true)` - This call revoked the token
    /// * `Ok(false)` - Unknown, already revoked, or expired
    async fn revoke_if_active(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError>;

    /// Revoke the presented token and insert its replacement as one unit
    ///
    /// Either both writes happen or neither does. When the presented token is
    /// no longer active the replacement is not inserted and `Ok(false)` is
    /// returned.
    async fn rotate(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError>;

    /// Delete the given records, returning how many existed
    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, DomainError>;

    /// Delete every record that has expired at `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count the records owned by a user
    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        Ok(self.list_for_user(user_id).await?.len())
    }
}
