//! Access and refresh token validation

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::decode;
use tracing::debug;

use crate::domain::entities::token::{AccessClaims, RefreshToken};
use crate::errors::{DomainError, DomainResult, TokenRejection};
use crate::repositories::RefreshTokenRepository;
use crate::services::settings::SettingsProvider;

use super::config::AccessTokenSettings;

/// Verifies access tokens and refresh tokens
pub struct TokenValidator<R: RefreshTokenRepository> {
    repository: Arc<R>,
    settings: Arc<SettingsProvider>,
}

impl<R: RefreshTokenRepository> Clone for TokenValidator<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<R: RefreshTokenRepository> TokenValidator<R> {
    pub fn new(repository: Arc<R>, settings: Arc<SettingsProvider>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Verify an access token against the current signing configuration
    ///
    /// # Returns
    /// * `Ok(Some(claims))` - Signature, expiry, issuer and audience hold
    /// * `Ok(None)` - The token is invalid for any reason
    /// * `Err(DomainError::Configuration)` - No usable signing key
    pub async fn validate_access_token(&self, token: &str) -> DomainResult<Option<AccessClaims>> {
        let settings = AccessTokenSettings::load(&self.settings).await?;
        Ok(Self::verify_access_token(&settings, token))
    }

    /// Verify an access token with already loaded settings
    pub fn verify_access_token(settings: &AccessTokenSettings, token: &str) -> Option<AccessClaims> {
        match decode::<AccessClaims>(token, &settings.decoding_key(), &settings.validation()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Access token rejected: {:?}", e.kind());
                None
            }
        }
    }

    /// Look up a presented refresh token and check it is still active
    ///
    /// Unknown, revoked and expired tokens all fail with the same
    /// `Unauthorized("invalid refresh token")`. Store failures propagate.
    pub async fn validate_refresh_token(&self, token: &str) -> DomainResult<RefreshToken> {
        let token_hash = RefreshToken::hash(token);

        let record = match self.repository.find_by_hash(&token_hash).await? {
            Some(record) => record,
            None => return Err(reject(TokenRejection::NotFound)),
        };

        if record.is_revoked() {
            return Err(reject(TokenRejection::Revoked));
        }
        if record.is_expired_at(Utc::now()) {
            return Err(reject(TokenRejection::Expired));
        }

        Ok(record)
    }
}

pub(crate) fn reject(reason: TokenRejection) -> DomainError {
    debug!("Refresh token rejected: {}", reason);
    DomainError::invalid_refresh_token()
}
