//! Bounds the number of refresh tokens stored per user

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::repositories::RefreshTokenRepository;
use crate::services::settings::SettingsProvider;

use super::config::RefreshTokenSettings;

/// Result of one recycling pass for a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecycleOutcome {
    /// Expired tokens deleted
    pub expired_removed: usize,
    /// Unexpired tokens deleted because they were beyond the retention cap
    pub overflow_removed: usize,
    /// Tokens left for the user
    pub retained: usize,
}

/// Prunes a user's refresh tokens to the most recent `retention_count`
///
/// Runs inline after every issuance. Two concurrent issuances for the same
/// user may briefly leave one token above the cap; the next pass removes it.
pub struct RecyclingPolicy<R: RefreshTokenRepository> {
    repository: Arc<R>,
    settings: Arc<SettingsProvider>,
}

impl<R: RefreshTokenRepository> Clone for RecyclingPolicy<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<R: RefreshTokenRepository> RecyclingPolicy<R> {
    pub fn new(repository: Arc<R>, settings: Arc<SettingsProvider>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Recycle a user's tokens using the configured retention count
    pub async fn recycle(&self, user_id: Uuid) -> DomainResult<RecycleOutcome> {
        let policy = RefreshTokenSettings::load(&self.settings).await?;
        self.recycle_with_cap(user_id, policy.retention_count, Utc::now())
            .await
    }

    /// Delete expired tokens, then everything beyond the `cap` newest
    pub async fn recycle_with_cap(
        &self,
        user_id: Uuid,
        cap: usize,
        now: DateTime<Utc>,
    ) -> DomainResult<RecycleOutcome> {
        let tokens = self.repository.list_for_user(user_id).await?;

        let (expired, mut remaining): (Vec<_>, Vec<_>) =
            tokens.into_iter().partition(|token| token.is_expired_at(now));

        // stable, so ties keep the store's newest-first order
        remaining.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let overflow = if remaining.len() > cap {
            remaining.split_off(cap)
        } else {
            Vec::new()
        };

        let doomed: Vec<Uuid> = expired
            .iter()
            .chain(overflow.iter())
            .map(|token| token.id)
            .collect();

        if doomed.is_empty() {
            return Ok(RecycleOutcome {
                retained: remaining.len(),
                ..RecycleOutcome::default()
            });
        }

        let deleted = self.repository.delete_by_ids(&doomed).await?;
        let outcome = RecycleOutcome {
            expired_removed: expired.len(),
            overflow_removed: overflow.len(),
            retained: remaining.len(),
        };

        debug!(
            user_id = %user_id,
            deleted = deleted,
            expired = outcome.expired_removed,
            overflow = outcome.overflow_removed,
            retained = outcome.retained,
            "Recycled refresh tokens"
        );

        Ok(outcome)
    }

    /// Delete expired tokens of every user
    ///
    /// For deployments that prefer a scheduled sweep in addition to the
    /// inline pass.
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        let deleted = self.repository.delete_expired(Utc::now()).await?;
        info!("Deleted {} expired refresh tokens", deleted);
        Ok(deleted)
    }
}
