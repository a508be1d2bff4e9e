use actix_web::{web, HttpResponse};

use crate::handlers::ApiError;
use crate::middleware::AuthContext;

use ca_core::repositories::{RefreshTokenRepository, UserRepository};

use super::AppState;

/// Handler for GET /auth/me
///
/// Requires `Authorization: Bearer {access_token}`. Returns the caller's
/// user id, username, role names and permissions as currently stored.
pub async fn me<U, R>(
    state: web::Data<AppState<U, R>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    let profile = state.auth_service.profile(&auth.claims).await?;
    Ok(HttpResponse::Ok().json(profile))
}
