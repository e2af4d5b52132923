//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use sietch_common::AppError;

/// Header the auth gateway stores the caller's identity in.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, identified by the gateway-provided user id.
#[derive(Debug, Clone)]
pub struct AuthPlayer(pub String);

impl<S> FromRequestParts<S> for AuthPlayer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Self(id.to_string()))
            .ok_or_else(|| {
                tracing::debug!(path = %parts.uri.path(), "Rejected request without caller identity");
                AppError::Unauthorized
            })
    }
}
