//! Authentication extractor for Axum
//!
//! Extracts the Bearer token from the request and verifies it against the
//! identity service. Provides the `RequireUser` extractor for handlers.

use crate::api::error::ApiError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use geogate_core::{AuthUser, Error, IdentityProvider};
use std::sync::Arc;

/// Axum extractor that requires a verified user.
///
/// Handlers that want to customize the unauthenticated response take
/// `Result<RequireUser, AuthRejection>` and map the rejection themselves.
pub struct RequireUser(pub AuthUser);

/// Auth rejection carrying the underlying error
#[derive(Debug)]
pub struct AuthRejection(pub Error);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        ApiError::from(self.0).into_response()
    }
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        ApiError(rejection.0)
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Arc<dyn IdentityProvider>>()
            .ok_or_else(|| {
                AuthRejection(Error::Internal("Identity provider not configured".into()))
            })?
            .clone();

        let token = extract_bearer(parts).ok_or(AuthRejection(Error::Unauthorized))?;
        let user = identity
            .verify_token(&token)
            .await
            .map_err(AuthRejection)?;

        Ok(RequireUser(user))
    }
}

/// Extract a token from the `Authorization: Bearer <token>` header
fn extract_bearer(parts: &Parts) -> Option<String> {
    let value = parts.headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/analyze");
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(extract_bearer(&parts).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_header_yields_none() {
        let parts = parts_with_auth(None);
        assert!(extract_bearer(&parts).is_none());
    }

    #[test]
    fn non_bearer_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(extract_bearer(&parts).is_none());
    }

    #[test]
    fn empty_bearer_rejected() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(extract_bearer(&parts).is_none());
    }
}
