//! Configuration module
//!
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//! - `settings` - How the process reaches the encrypted settings store

pub mod database;
pub mod environment;
pub mod server;
pub mod settings;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};
pub use settings::SettingsConfig;

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "COREACCESS";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Settings-store configuration
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Sources, later ones winning:
    /// 1. built-in defaults
    /// 2. `config/default.toml` (optional)
    /// 3. `config/{environment}.toml` (optional)
    /// 4. `COREACCESS__SECTION__KEY` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = Environment::from_env();

        let loaded = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&env.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let explicit_logging = loaded.get_string("logging.level").is_ok();
        let mut app: AppConfig = loaded.try_deserialize()?;
        app.environment = env;
        if !explicit_logging {
            app.logging = LoggingConfig::for_environment(env);
        }

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_every_section() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.settings.cache_ttl_seconds, 300);
        assert_eq!(config.settings.protection_key_path, "keys/settings.key");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"server": {"host": "0.0.0.0", "port": 9090}, "settings": {"cache_ttl_seconds": 60}}"#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.settings.cache_ttl().as_secs(), 60);
        assert_eq!(config.settings.protection_key_path, "keys/settings.key");
    }
}
