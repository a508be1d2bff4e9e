//! Conversion of domain errors into HTTP responses
//!
//! Every failure leaving a handler is an [`ApiError`]. Its status code is a
//! plain lookup on [`ErrorKind`]; the body is the shared [`ErrorResponse`]
//! envelope.

use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ca_core::errors::{DomainError, ErrorKind};
use ca_shared::{error_codes, ErrorResponse};
use tracing::error;
use validator::ValidationErrors;

/// Error returned by every handler and extractor
#[derive(Debug)]
pub struct ApiError(DomainError);

impl ApiError {
    /// Malformed or invalid request body
    pub fn validation(message: impl Into<String>) -> Self {
        Self(DomainError::Validation {
            message: message.into(),
        })
    }

    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        Self::validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

/// HTTP status for an error kind
///
/// Lookup failures on the auth path are reported as 401, never 404.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::UNAUTHORIZED,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message safe to show the caller
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::Authentication => "invalid username or password".to_string(),
        DomainError::Unauthorized { message } => message.clone(),
        DomainError::NotFound { .. } | DomainError::Conflict { .. } => {
            ca_core::errors::INVALID_ACCESS_TOKEN.to_string()
        }
        DomainError::Validation { message } => message.clone(),
        DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            "An internal error occurred".to_string()
        }
    }
}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Authentication => error_codes::AUTHENTICATION_FAILED,
        ErrorKind::Unauthorized | ErrorKind::NotFound | ErrorKind::Conflict => {
            error_codes::UNAUTHORIZED
        }
        ErrorKind::Validation => error_codes::VALIDATION_ERROR,
        ErrorKind::Configuration => error_codes::CONFIGURATION_ERROR,
        ErrorKind::Internal => error_codes::INTERNAL_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        HttpResponse::build(status).json(ErrorResponse::new(
            error_code(self.kind()),
            public_message(&self.0),
        ))
    }
}
