//! In-memory implementation of RefreshTokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::RefreshTokenRepository;

/// Mock token repository for testing
///
/// Records are kept in insertion order. Every conditional write happens
/// under one write lock, which gives the same guarantee as the conditional
/// `UPDATE` of the SQL implementation.
#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<RwLock<Vec<RefreshToken>>>,
    fail_rotation: Arc<AtomicBool>,
}

impl MockRefreshTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `rotate` call fail with a store error and write nothing
    pub fn fail_next_rotation(&self) {
        self.fail_rotation.store(true, Ordering::SeqCst);
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.clone()
    }
}

fn revoke_active(
    tokens: &mut [RefreshToken],
    token_hash: &str,
    at: DateTime<Utc>,
    by_ip: &str,
) -> bool {
    match tokens.iter_mut().find(|t| t.token_hash == token_hash) {
        Some(token) if token.is_active_at(at) => {
            token.revoke(at, by_ip);
            true
        }
        _ => false,
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.iter().any(|t| t.token_hash == token.token_hash) {
            return Err(DomainError::Conflict {
                message: "Token already exists".to_string(),
            });
        }

        tokens.push(token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn revoke_if_active(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_active(&mut tokens, token_hash, at, by_ip))
    }

    async fn rotate(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        if self.fail_rotation.swap(false, Ordering::SeqCst) {
            return Err(DomainError::internal("simulated store failure"));
        }
        if tokens.iter().any(|t| t.token_hash == replacement.token_hash) {
            return Err(DomainError::Conflict {
                message: "Token already exists".to_string(),
            });
        }
        if !revoke_active(&mut tokens, token_hash, at, by_ip) {
            return Ok(false);
        }

        tokens.push(replacement);
        Ok(true)
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !ids.contains(&t.id));
        Ok(before - tokens.len())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !t.is_expired_at(now));
        Ok(before - tokens.len())
    }
}
