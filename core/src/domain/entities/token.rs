//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

/// Access token lifetime when `jwt.expiresInSeconds` is not set (1 hour)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Refresh token lifetime when `refreshToken.expiresInDays` is not set
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Refresh tokens retained per user when `refreshToken.retentionCount` is not set
pub const DEFAULT_RETENTION_COUNT: usize = 5;

/// Claim names embedded in access tokens.
///
/// These are a wire contract with resource servers.
pub mod claim_types {
    pub const USER_ID: &str = "coreaccess:user_id";
    pub const USERNAME: &str = "coreaccess:username";
    pub const ROLE: &str = "coreaccess:role";
    pub const TOKEN_ID: &str = "coreaccess:token_id";
    pub const PERMISSIONS: &str = "coreaccess:permissions";
    pub const SUBJECT: &str = "sub";
    pub const ISSUER: &str = "iss";
    pub const AUDIENCE: &str = "aud";
    pub const ISSUED_AT: &str = "iat";
    pub const EXPIRES_AT: &str = "exp";
}

/// Claims structure for the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    #[serde(rename = "coreaccess:user_id")]
    pub user_id: String,

    #[serde(rename = "coreaccess:username")]
    pub username: String,

    /// Fresh nonce per access token
    #[serde(rename = "coreaccess:token_id")]
    pub token_id: String,

    #[serde(
        rename = "coreaccess:role",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roles: Vec<String>,

    /// Comma-joined, de-duplicated permission names
    #[serde(
        rename = "coreaccess:permissions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub permissions: Option<String>,

    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A single named assertion taken from an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    fn new(claim_type: &str, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.to_string(),
            value: value.into(),
        }
    }
}

impl AccessClaims {
    /// Flattens the payload into individual claims, one per role
    pub fn claims(&self) -> Vec<Claim> {
        let mut claims = vec![
            Claim::new(claim_types::SUBJECT, &self.sub),
            Claim::new(claim_types::USER_ID, &self.user_id),
            Claim::new(claim_types::USERNAME, &self.username),
            Claim::new(claim_types::TOKEN_ID, &self.token_id),
        ];
        claims.extend(
            self.roles
                .iter()
                .map(|role| Claim::new(claim_types::ROLE, role)),
        );
        if let Some(permissions) = &self.permissions {
            claims.push(Claim::new(claim_types::PERMISSIONS, permissions));
        }
        claims.push(Claim::new(claim_types::ISSUER, &self.iss));
        claims.push(Claim::new(claim_types::AUDIENCE, &self.aud));
        claims.push(Claim::new(claim_types::ISSUED_AT, self.iat.to_string()));
        claims.push(Claim::new(claim_types::EXPIRES_AT, self.exp.to_string()));
        claims
    }

    /// Returns the first claim of the given type
    ///
    /// # Errors
    ///
    /// `NotFound` when the token carries no such claim.
    pub fn claim(&self, claim_type: &str) -> DomainResult<Claim> {
        self.claims()
            .into_iter()
            .find(|claim| claim.claim_type == claim_type && !claim.value.is_empty())
            .ok_or_else(|| DomainError::not_found(format!("claim {}", claim_type)))
    }

    /// Parses the `coreaccess:user_id` claim
    pub fn user_id(&self) -> DomainResult<Uuid> {
        let claim = self.claim(claim_types::USER_ID)?;
        Uuid::parse_str(&claim.value)
            .map_err(|_| DomainError::not_found(format!("claim {}", claim_types::USER_ID)))
    }

    /// Permission names split back out of the comma-joined claim
    pub fn permission_list(&self) -> Vec<String> {
        self.permissions
            .as_deref()
            .map(|joined| {
                joined
                    .split(',')
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Accepts a role claim serialized either as a single string or an array
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

/// Refresh token record stored in the database
///
/// The plaintext token value is never stored; `token_hash` holds its SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// Hex SHA-256 of the token value
    pub token_hash: String,

    pub created_at: DateTime<Utc>,
    pub created_by_ip: String,
    pub expires_at: DateTime<Utc>,

    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,
}

impl RefreshToken {
    /// Creates a new, unrevoked refresh token record
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        created_by_ip: impl Into<String>,
        created_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at,
            created_by_ip: created_by_ip.into(),
            expires_at: created_at + lifetime,
            revoked_at: None,
            revoked_by_ip: None,
        }
    }

    /// Hashes a presented token value the same way it was stored
    pub fn hash(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Not revoked and not expired at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Marks the token revoked; the only mutation a stored token ever sees
    pub fn revoke(&mut self, at: DateTime<Utc>, by_ip: impl Into<String>) {
        self.revoked_at = Some(at);
        self.revoked_by_ip = Some(by_ip.into());
    }
}

/// A freshly minted refresh token together with its plaintext value
///
/// This is the only place the plaintext value exists.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub record: RefreshToken,
    pub token: String,
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// When the refresh token stops being accepted
    pub refresh_expires_at: DateTime<Utc>,
}
