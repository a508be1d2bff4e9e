//! Domain entities representing core business objects.

pub mod setting;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use setting::{setting_keys, SettingEntry};
pub use token::{
    claim_types, AccessClaims, Claim, IssuedRefreshToken, RefreshToken, TokenPair,
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_DAYS, DEFAULT_RETENTION_COUNT,
};
pub use user::{Role, User};
