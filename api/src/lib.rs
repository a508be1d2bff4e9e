//! HTTP surface of the CoreAccess token lifecycle
//!
//! Exposed as a library so the integration tests can build the same app the
//! binary serves.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::auth::AppState;
