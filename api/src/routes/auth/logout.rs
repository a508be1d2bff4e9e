use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{LogoutResponse, RefreshTokenRequest};
use crate::handlers::ApiError;

use ca_core::repositories::{RefreshTokenRepository, UserRepository};

use super::{client_ip, AppState};

/// Handler for POST /auth/logout
///
/// Revokes the presented refresh token without issuing a new one. Access
/// tokens already handed out stay valid until they expire.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty refresh token
/// - 401 Unauthorized: Unknown, expired or already revoked token
pub async fn logout<U, R>(
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
    state.rotation.logout(&request.refresh_token, &ip).await?;

    Ok(HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
