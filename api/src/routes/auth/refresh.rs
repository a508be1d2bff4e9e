use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::RefreshTokenRequest;
use crate::handlers::ApiError;

use ca_core::repositories::{RefreshTokenRepository, UserRepository};

use super::{client_ip, AppState};

/// Handler for POST /auth/refresh-token
///
/// Exchanges a refresh token for a new access/refresh pair. The presented
/// token is revoked in the same step; presenting it again fails.
///
/// # Request Body
///
/// ```json
/// {
///     "refreshToken": "string",
///     "loginIp": "203.0.113.7"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty refresh token
/// - 401 Unauthorized: Unknown, expired, revoked or already rotated token
/// - 500 Internal Server Error: Signing key missing or store failure
pub async fn refresh_token<U, R>(
    req: HttpRequest,
    state: web::Data<AppState<U, R>>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    request.validate()?;

    let ip = client_ip(&req, request.login_ip.as_deref());
    let pair = state.rotation.refresh(&request.refresh_token, &ip).await?;

    Ok(HttpResponse::Ok().json(pair))
}
