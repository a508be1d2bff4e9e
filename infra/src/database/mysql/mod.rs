//! MySQL repository implementations

mod refresh_token_repository;
mod settings_repository;
mod user_repository;

pub use refresh_token_repository::MySqlRefreshTokenRepository;
pub use settings_repository::MySqlSettingsRepository;
pub use user_repository::MySqlUserRepository;

use ca_core::errors::DomainError;

/// Convert a SQLx failure into the store-failure kind
pub(crate) fn store_error(context: &str, error: sqlx::Error) -> DomainError {
    tracing::error!("{}: {}", context, error);
    DomainError::internal(format!("{}: {}", context, error))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
