//! Bearer-token authentication for protected endpoints.
//!
//! [`AuthContext`] is an extractor: a handler that takes it only runs when
//! the `Authorization: Bearer` header carries a valid access token. The
//! verifier is registered once as `web::Data<dyn AccessTokenVerifier>` so the
//! extractor does not need to know the concrete repository types.

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, Error, FromRequest, HttpRequest};
use async_trait::async_trait;
use ca_core::{
    domain::AccessClaims,
    errors::{DomainError, DomainResult},
    repositories::RefreshTokenRepository,
    services::TokenValidator,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::handlers::ApiError;

/// Verifies access tokens for the extractor
#[async_trait]
pub trait AccessTokenVerifier: Send + Sync {
    /// `Ok(None)` for any invalid token, `Err` only for configuration or store failures
    async fn verify(&self, token: &str) -> DomainResult<Option<AccessClaims>>;
}

#[async_trait]
impl<R: RefreshTokenRepository + 'static> AccessTokenVerifier for TokenValidator<R> {
    async fn verify(&self, token: &str) -> DomainResult<Option<AccessClaims>> {
        self.validate_access_token(token).await
    }
}

/// Authenticated caller, built from verified access-token claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID from the `coreaccess:user_id` claim
    pub user_id: Uuid,
    /// Token ID, for log correlation
    pub token_id: String,
    pub claims: AccessClaims,
}

impl AuthContext {
    /// Fails with the uniform access-token rejection when the user id claim is unusable
    pub fn from_claims(claims: AccessClaims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::invalid_access_token())?;
        Ok(Self {
            user_id,
            token_id: claims.token_id.clone(),
            claims,
        })
    }
}

/// Extracts the Bearer token from the Authorization header
pub fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = extract_bearer_token(req);
        let verifier = req.app_data::<web::Data<dyn AccessTokenVerifier>>().cloned();

        Box::pin(async move {
            let verifier = verifier.ok_or_else(|| {
                ApiError::from(DomainError::configuration("access token verifier not registered"))
            })?;
            let token = token.ok_or_else(|| ApiError::from(DomainError::invalid_access_token()))?;

            let claims = verifier
                .verify(&token)
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::from(DomainError::invalid_access_token()))?;

            Ok(AuthContext::from_claims(claims).map_err(ApiError::from)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[test]
    fn test_extract_bearer_token() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_empty = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req_empty), None);

        let req_no_header = actix_test::TestRequest::default().to_http_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }
}
