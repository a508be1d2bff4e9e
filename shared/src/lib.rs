//! Shared configuration and response types for the CoreAccess server
//!
//! This crate provides the pieces every other server crate needs:
//! - Process configuration and its loader
//! - The JSON error envelope returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, CorsConfig, DatabaseConfig, Environment, LoggingConfig, ServerConfig,
    SettingsConfig,
};
pub use errors::{error_codes, ErrorResponse};
