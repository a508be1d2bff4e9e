//! # Infrastructure Layer
//!
//! Concrete implementations of the `ca_core` repository traits and the
//! local key storage the settings protector depends on.
//!
//! ## Architecture
//!
//! - **Database**: MySQL repositories using SQLx
//! - **Keys**: the on-disk protection key for secret settings

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Protection key file handling
pub mod keys;

pub use database::{
    DatabasePool, MySqlRefreshTokenRepository, MySqlSettingsRepository, MySqlUserRepository,
    PoolStatistics,
};
pub use keys::load_or_create_key;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
