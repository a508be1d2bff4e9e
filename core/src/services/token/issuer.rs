//! Access and refresh token issuance

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Header};
use rand::{rngs::OsRng, RngCore};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::token::{IssuedRefreshToken, RefreshToken, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::RefreshTokenRepository;
use crate::services::settings::SettingsProvider;

use super::claims::ClaimsBuilder;
use super::config::{AccessTokenSettings, RefreshTokenSettings};
use super::recycling::RecyclingPolicy;

/// Random bytes in a refresh token value (256 bits)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Mints access tokens and refresh tokens
///
/// Signing material and lifetimes are read from the settings provider on
/// every call, so a `set` on the store takes effect on the next issuance.
pub struct TokenIssuer<R: RefreshTokenRepository> {
    repository: Arc<R>,
    settings: Arc<SettingsProvider>,
    recycling: RecyclingPolicy<R>,
}

impl<R: RefreshTokenRepository> Clone for TokenIssuer<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: Arc::clone(&self.settings),
            recycling: self.recycling.clone(),
        }
    }
}

impl<R: RefreshTokenRepository> TokenIssuer<R> {
    pub fn new(repository: Arc<R>, settings: Arc<SettingsProvider>) -> Self {
        let recycling = RecyclingPolicy::new(Arc::clone(&repository), Arc::clone(&settings));
        Self {
            repository,
            settings,
            recycling,
        }
    }

    pub fn recycling(&self) -> &RecyclingPolicy<R> {
        &self.recycling
    }

    /// Sign a new access token for `user`
    ///
    /// # Errors
    /// `Configuration` when the signing key is missing or too short.
    pub async fn generate_access_token(&self, user: &User) -> DomainResult<String> {
        let settings = AccessTokenSettings::load(&self.settings).await?;
        Self::sign_access_token(&settings, user, Utc::now())
    }

    /// Sign an access token with already loaded settings
    pub fn sign_access_token(
        settings: &AccessTokenSettings,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<String> {
        let claims = ClaimsBuilder::build(
            user,
            Uuid::new_v4(),
            &settings.issuer,
            &settings.audience,
            issued_at,
            settings.ttl,
        );

        encode(
            &Header::new(settings.algorithm()),
            &claims,
            &settings.encoding_key(),
        )
        .map_err(|e| DomainError::internal(format!("Failed to sign access token: {}", e)))
    }

    /// Create a refresh token value and its record without persisting it
    pub fn mint_refresh_token(
        settings: &RefreshTokenSettings,
        user_id: Uuid,
        created_by_ip: &str,
        created_at: DateTime<Utc>,
    ) -> IssuedRefreshToken {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let record = RefreshToken::new(
            user_id,
            RefreshToken::hash(&token),
            created_by_ip,
            created_at,
            settings.ttl,
        );

        IssuedRefreshToken { record, token }
    }

    /// Create, persist and return a refresh token for `user`, then recycle
    /// the user's token set
    pub async fn generate_refresh_token(
        &self,
        user: &User,
        created_by_ip: &str,
    ) -> DomainResult<IssuedRefreshToken> {
        let settings = RefreshTokenSettings::load(&self.settings).await?;
        let issued = Self::mint_refresh_token(&settings, user.id, created_by_ip, Utc::now());

        self.repository.save(issued.record.clone()).await?;
        self.recycle_after_issuance(user.id, settings.retention_count)
            .await;

        Ok(issued)
    }

    /// Issue a fresh access/refresh pair, as on login
    pub async fn issue_pair(&self, user: &User, created_by_ip: &str) -> DomainResult<TokenPair> {
        let access_settings = AccessTokenSettings::load(&self.settings).await?;
        let access_token = Self::sign_access_token(&access_settings, user, Utc::now())?;
        let refresh = self.generate_refresh_token(user, created_by_ip).await?;

        info!(user_id = %user.id, "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            expires_in: access_settings.ttl.num_seconds(),
            refresh_expires_at: refresh.record.expires_at,
        })
    }

    /// Run the recycling policy after a token was stored
    ///
    /// The new token is already committed at this point, so a failure here is
    /// logged and left for the next pass.
    pub(crate) async fn recycle_after_issuance(&self, user_id: Uuid, cap: usize) {
        if let Err(e) = self
            .recycling
            .recycle_with_cap(user_id, cap, Utc::now())
            .await
        {
            error!(user_id = %user_id, "Failed to recycle refresh tokens: {}", e);
        }
    }

    pub(crate) fn settings(&self) -> &Arc<SettingsProvider> {
        &self.settings
    }

    pub(crate) fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}
