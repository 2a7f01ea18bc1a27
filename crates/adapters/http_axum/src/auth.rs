//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header};
use axum::http::request::Parts;

use roomhub_domain::error::AuthenticationError;
use roomhub_domain::user::Identity;

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// The identity resolved from the request's `Authorization: Bearer <token>`
/// header. Handlers taking this extractor reject anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<B: Backend> FromRequestParts<AppState<B>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let identity = state.auth_service.authenticate(token).await?;
        tracing::debug!(user_id = %identity.user_id, "request authenticated");
        Ok(Self(identity))
    }
}

/// Read the secret from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthenticationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError::MissingToken)?
        .to_str()
        .map_err(|_| AuthenticationError::InvalidToken)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthenticationError::InvalidToken)
}
