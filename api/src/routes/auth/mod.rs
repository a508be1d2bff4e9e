//! Authentication route handlers
//!
//! - `POST /auth/login` - password login
//! - `POST /auth/refresh-token` - refresh-token rotation
//! - `POST /auth/logout` - refresh-token revocation
//! - `GET /auth/me` - profile of the bearer of an access token

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;

use std::sync::Arc;

use actix_web::HttpRequest;
use ca_core::repositories::{RefreshTokenRepository, UserRepository};
use ca_core::services::{
    AuthService, RecyclingPolicy, SettingsProvider, TokenIssuer, TokenRotation, TokenValidator,
};

/// Application state that holds shared services
pub struct AppState<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub auth_service: AuthService<U, R>,
    pub rotation: TokenRotation<R, U>,
    pub validator: TokenValidator<R>,
    pub recycling: RecyclingPolicy<R>,
}

impl<U, R> AppState<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    /// Wire the token services over the given stores
    pub fn new(users: Arc<U>, tokens: Arc<R>, settings: Arc<SettingsProvider>) -> Self {
        let issuer = TokenIssuer::new(Arc::clone(&tokens), Arc::clone(&settings));
        let validator = TokenValidator::new(tokens, settings);
        let recycling = issuer.recycling().clone();

        Self {
            auth_service: AuthService::new(Arc::clone(&users), issuer.clone()),
            rotation: TokenRotation::new(issuer, validator.clone(), users),
            validator,
            recycling,
        }
    }
}

/// Address recorded on issued and revoked refresh tokens
///
/// The `loginIp` sent by the client wins; otherwise the peer address as
/// reported by the connection (honouring `Forwarded`/`X-Forwarded-For`).
pub(crate) fn client_ip(req: &HttpRequest, login_ip: Option<&str>) -> String {
    login_ip
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| {
            req.connection_info()
                .realip_remote_addr()
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}
