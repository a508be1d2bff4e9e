//! Error kinds and internal rejection reasons

use std::fmt;

/// Closed set of error kinds crossing the subsystem boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Unauthorized,
    NotFound,
    Conflict,
    Validation,
    Internal,
}

/// Why a token was rejected.
///
/// Only ever logged; callers receive the uniform `Unauthorized` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    NotFound,
    Expired,
    Revoked,
    OwnerMissing,
    OwnerInactive,
    RotationLost,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TokenRejection::NotFound => "not found",
            TokenRejection::Expired => "expired",
            TokenRejection::Revoked => "revoked",
            TokenRejection::OwnerMissing => "owning user no longer exists",
            TokenRejection::OwnerInactive => "owning user is disabled",
            TokenRejection::RotationLost => "already consumed by a concurrent rotation",
        };
        f.write_str(reason)
    }
}
