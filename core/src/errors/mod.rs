//! Domain error taxonomy for the token lifecycle.
//!
//! Every failure that leaves this crate is one of a small, closed set of
//! kinds. The HTTP layer maps [`ErrorKind`] to a status code with a plain
//! lookup and never inspects messages.

mod types;


pub use types::{ErrorKind, TokenRejection};

use thiserror::Error;

/// Public message for every refresh-token failure
pub const INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

/// Public message for every access-token failure
pub const INVALID_ACCESS_TOKEN: &str = "invalid token";

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or invalid signing material or settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Bad credentials on login
    #[error("Authentication failed")]
    Authentication,

    /// Invalid, expired, revoked or malformed token
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Concurrent modification of the same record
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Store or transport failure
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// The uniform refresh-token rejection
    pub fn invalid_refresh_token() -> Self {
        Self::Unauthorized {
            message: INVALID_REFRESH_TOKEN.to_string(),
        }
    }

    /// The uniform access-token rejection
    pub fn invalid_access_token() -> Self {
        Self::Unauthorized {
            message: INVALID_ACCESS_TOKEN.to_string(),
        }
    }

    /// Closed error kind used for transport mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Authentication => ErrorKind::Authentication,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Folds lookup failures into the uniform refresh-token rejection.
    ///
    /// Store failures pass through untouched so the caller still sees a
    /// fatal error when the database is unreachable.
    pub fn into_refresh_rejection(self) -> Self {
        match self {
            Self::NotFound { .. } | Self::Conflict { .. } | Self::Unauthorized { .. } => {
                Self::invalid_refresh_token()
            }
            other => other,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
