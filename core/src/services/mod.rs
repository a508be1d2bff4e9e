//! Business services containing domain logic and use cases.

pub mod auth;
pub mod protection;
pub mod settings;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, UserProfile};
pub use protection::{AesGcmSecretProtector, SecretProtector};
pub use settings::SettingsProvider;
pub use token::{
    ClaimsBuilder, RecycleOutcome, RecyclingPolicy, TokenIssuer, TokenRotation, TokenSettings,
    TokenValidator,
};
