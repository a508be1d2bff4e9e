//! # CoreAccess Core
//!
//! Token lifecycle domain layer for the CoreAccess backend: access-token
//! issuance and validation, refresh-token rotation and recycling, secret
//! protection and the settings provider they read from.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{AccessClaims, RefreshToken, Role, SettingEntry, TokenPair, User};
pub use errors::{DomainError, DomainResult, ErrorKind};
pub use repositories::{RefreshTokenRepository, SettingsRepository, UserRepository};
