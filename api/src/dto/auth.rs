use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 256))]
    pub username: String,

    #[validate(length(min = 1, max = 1024))]
    pub password: String,

    /// Client address as seen by the caller; the peer address is used when absent
    #[serde(default)]
    #[validate(length(max = 64))]
    pub login_ip: Option<String>,
}

/// Body of `POST /auth/refresh-token` and `POST /auth/logout`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 512))]
    pub refresh_token: String,

    #[serde(default)]
    #[validate(length(max = 64))]
    pub login_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
