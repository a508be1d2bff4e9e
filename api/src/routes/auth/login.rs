use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::LoginRequest;
use crate::handlers::ApiError;

use ca_core::repositories::{RefreshTokenRepository, UserRepository};

use super::{client_ip, AppState};

/// Handler for POST /auth/login
///
/// # Request Body
///
/// ```json
/// {
///     "username": "u1",
///     "password": "secret",
///     "loginIp": "203.0.113.7"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "43-char url-safe string",
///     "expires_in": 3600,
///     "refresh_expires_at": "2024-01-08T00:00:00Z"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty username or password
/// - 401 Unauthorized: Unknown user, wrong password or disabled account
pub async fn login<U, R>(
    req: HttpRequest,
    state: web::Data<AppState<U, R>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    request.validate()?;

    let ip = client_ip(&req, request.login_ip.as_deref());
    let pair = state
        .auth_service
        .login(&request.username, &request.password, &ip)
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}
