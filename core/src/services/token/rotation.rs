//! Refresh-token rotation and logout

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::entities::token::TokenPair;
use crate::errors::{DomainError, DomainResult, TokenRejection};
use crate::repositories::{RefreshTokenRepository, UserRepository};

use super::config::TokenSettings;
use super::issuer::TokenIssuer;
use super::validator::{reject, TokenValidator};

/// Exchanges a refresh token for a new pair, or revokes it on logout
///
/// The revoke of the presented token and the insert of its replacement are a
/// single `rotate` call on the store. Of two callers presenting the same
/// token, exactly one gets a new pair.
pub struct TokenRotation<R, U>
where
    R: RefreshTokenRepository,
    U: UserRepository,
{
    issuer: TokenIssuer<R>,
    validator: TokenValidator<R>,
    users: Arc<U>,
}

impl<R, U> TokenRotation<R, U>
where
    R: RefreshTokenRepository,
    U: UserRepository,
{
    pub fn new(issuer: TokenIssuer<R>, validator: TokenValidator<R>, users: Arc<U>) -> Self {
        Self {
            issuer,
            validator,
            users,
        }
    }

    /// Rotate `refresh_token`, returning a new access/refresh pair
    ///
    /// # Errors
    /// * `Unauthorized` - Token unknown, revoked, expired, already rotated,
    ///   or its owner no longer exists
    /// * `Configuration` - Signing key missing or invalid
    /// * `Internal` - Store failure; nothing was written
    pub async fn refresh(&self, refresh_token: &str, login_ip: &str) -> DomainResult<TokenPair> {
        let presented = self.validator.validate_refresh_token(refresh_token).await?;

        let user = match self.users.find_by_id(presented.user_id).await? {
            Some(user) if user.is_active => user,
            Some(_) => return Err(reject(TokenRejection::OwnerInactive)),
            None => return Err(reject(TokenRejection::OwnerMissing)),
        };

        let settings = TokenSettings::load(self.issuer.settings()).await?;
        let now = Utc::now();

        let access_token = TokenIssuer::<R>::sign_access_token(&settings.access, &user, now)?;
        let replacement =
            TokenIssuer::<R>::mint_refresh_token(&settings.refresh, user.id, login_ip, now);

        let rotated = self
            .issuer
            .repository()
            .rotate(
                &presented.token_hash,
                now,
                login_ip,
                replacement.record.clone(),
            )
            .await
            .map_err(DomainError::into_refresh_rejection)?;

        if !rotated {
            warn!(
                user_id = %user.id,
                ip = login_ip,
                "Refresh token presented again after rotation"
            );
            return Err(reject(TokenRejection::RotationLost));
        }

        self.issuer
            .recycle_after_issuance(user.id, settings.refresh.retention_count)
            .await;

        info!(user_id = %user.id, "Rotated refresh token");

        Ok(TokenPair {
            access_token,
            refresh_token: replacement.token,
            expires_in: settings.access.ttl.num_seconds(),
            refresh_expires_at: replacement.record.expires_at,
        })
    }

    /// Revoke `refresh_token` without issuing a replacement
    ///
    /// Unknown, revoked and expired tokens are rejected with the same
    /// `Unauthorized` as on refresh.
    pub async fn logout(&self, refresh_token: &str, login_ip: &str) -> DomainResult<()> {
        let presented = self.validator.validate_refresh_token(refresh_token).await?;

        let revoked = self
            .issuer
            .repository()
            .revoke_if_active(&presented.token_hash, Utc::now(), login_ip)
            .await?;

        if !revoked {
            warn!(user_id = %presented.user_id, "Logout lost a race with another revocation");
            return Err(reject(TokenRejection::RotationLost));
        }

        info!(user_id = %presented.user_id, "Revoked refresh token on logout");
        Ok(())
    }
}
