//! Repository traits at the boundary to the external stores.

pub mod settings;
pub mod token;
pub mod user;

pub use settings::SettingsRepository;
pub use token::RefreshTokenRepository;
pub use user::UserRepository;

#[cfg(any(test, feature = "testing"))]
pub use settings::MockSettingsRepository;
#[cfg(any(test, feature = "testing"))]
pub use token::MockRefreshTokenRepository;
#[cfg(any(test, feature = "testing"))]
pub use user::MockUserRepository;
