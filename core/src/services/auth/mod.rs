//! Authentication service module
//!
//! Password login on top of the token lifecycle:
//! - Credential check against the identity store (bcrypt)
//! - Token pair issuance for the authenticated user
//! - Profile lookup for a validated access token

mod service;


pub use service::{AuthService, UserProfile};
