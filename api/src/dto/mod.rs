pub mod auth;

pub use auth::{HealthResponse, LoginRequest, LogoutResponse, RefreshTokenRequest};
