pub mod auth;
pub mod cors;

pub use auth::{AccessTokenVerifier, AuthContext};
pub use cors::create_cors;
