use actix_web::HttpResponse;

use crate::dto::HealthResponse;

/// Handler for GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "coreaccess-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
