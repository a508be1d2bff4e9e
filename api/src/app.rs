//! Application factory
//!
//! Builds the actix-web `App` from an [`AppState`]. The binary and the
//! integration tests both go through [`create_app`].

use std::sync::Arc;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use ca_core::repositories::{RefreshTokenRepository, UserRepository};
use ca_shared::{error_codes, CorsConfig, ErrorResponse};
use tracing_actix_web::TracingLogger;

use crate::handlers::ApiError;
use crate::middleware::{create_cors, AccessTokenVerifier};
use crate::routes::auth::{login::login, logout::logout, me::me, refresh::refresh_token, AppState};
use crate::routes::health::health_check;

/// Create and configure the application with all dependencies
pub fn create_app<U, R>(
    app_state: web::Data<AppState<U, R>>,
    cors: &CorsConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    let verifier: Arc<dyn AccessTokenVerifier> = Arc::new(app_state.validator.clone());

    App::new()
        .app_data(app_state)
        .app_data(web::Data::from(verifier))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::validation(format!("invalid request body: {}", err)).into()
        }))
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(login::<U, R>))
                .route("/refresh-token", web::post().to(refresh_token::<U, R>))
                .route("/logout", web::post().to(logout::<U, R>))
                .route("/me", web::get().to(me::<U, R>)),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
