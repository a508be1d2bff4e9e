//! Main authentication service implementation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{AccessClaims, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{RefreshTokenRepository, UserRepository};
use crate::services::token::TokenIssuer;

/// What `GET /auth/me` reports about the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            roles: user.role_names(),
            permissions: user.permissions(),
        }
    }
}

/// Authentication service for password login
pub struct AuthService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    /// Identity store
    user_repository: Arc<U>,
    /// Issues the token pair after a successful login
    issuer: TokenIssuer<R>,
}

impl<U, R> AuthService<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(user_repository: Arc<U>, issuer: TokenIssuer<R>) -> Self {
        Self {
            user_repository,
            issuer,
        }
    }

    /// Authenticate with username and password and issue a token pair
    ///
    /// # Arguments
    ///
    /// * `username` - Login name, matched exactly
    /// * `password` - Plaintext password, checked against the stored bcrypt hash
    /// * `login_ip` - Recorded on the new refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Credentials valid and account enabled
    /// * `Err(DomainError::Authentication)` - Unknown user, wrong password or
    ///   disabled account, indistinguishably
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        login_ip: &str,
    ) -> DomainResult<TokenPair> {
        let user = match self.user_repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(ip = login_ip, "Login failed: unknown user");
                return Err(DomainError::Authentication);
            }
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, ip = login_ip, "Login failed: wrong password");
            return Err(DomainError::Authentication);
        }

        if !user.is_active {
            warn!(user_id = %user.id, ip = login_ip, "Login failed: account disabled");
            return Err(DomainError::Authentication);
        }

        let pair = self.issuer.issue_pair(&user, login_ip).await?;
        info!(user_id = %user.id, ip = login_ip, "User logged in");

        Ok(pair)
    }

    /// Resolve the user behind validated access-token claims
    ///
    /// A missing or malformed `coreaccess:user_id` claim, or a user that no
    /// longer exists, is an authentication failure.
    pub async fn profile(&self, claims: &AccessClaims) -> DomainResult<UserProfile> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::invalid_access_token())?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(DomainError::invalid_access_token)?;

        Ok(UserProfile::from(&user))
    }
}

/// bcrypt is CPU-bound; run it off the async worker
async fn verify_password(password: &str, hash: &str) -> DomainResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("Password check aborted: {}", e)))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            error!("Stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}
