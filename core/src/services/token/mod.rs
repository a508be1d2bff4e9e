//! Token lifecycle: issuance, validation, rotation and recycling
//!
//! - Access tokens are HS256 JWTs signed with `jwt.secretKey`
//! - Refresh tokens are opaque random values stored as SHA-256 hashes
//! - Rotation revokes the presented token and stores its replacement in
//!   one store call
//! - Recycling keeps each user's stored refresh tokens bounded

mod claims;
mod config;
mod issuer;
mod recycling;
mod rotation;
mod validator;

#[cfg(test)]
mod tests;

pub use claims::ClaimsBuilder;
pub use config::{
    decode_signing_key, AccessTokenSettings, RefreshTokenSettings, TokenSettings,
    DEFAULT_AUDIENCE, DEFAULT_ISSUER, MAX_CLOCK_SKEW_SECONDS, MIN_SIGNING_KEY_LEN,
};
pub use issuer::{TokenIssuer, REFRESH_TOKEN_BYTES};
pub use recycling::{RecycleOutcome, RecyclingPolicy};
pub use rotation::TokenRotation;
pub use validator::TokenValidator;
