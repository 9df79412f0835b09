use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::models::Identity;
use crate::state::AppState;

const TOKEN_REQUIRED: &str = "Token required";

/// Authenticated caller, attached to the request by [`require_auth`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Identity,
    /// The bearer token the request presented
    pub token: String,
}

/// Request guard: every request re-verifies its bearer token with the
/// identity provider before reaching the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;

    let identity = state.auth.authenticate(&token).await?;
    tracing::debug!(user_id = %identity.id, "request authenticated");

    request.extensions_mut().insert(AuthUser { identity, token });
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized(TOKEN_REQUIRED))?;

    match value.strip_prefix("Bearer ") {
        // exactly one space after the scheme and a token without whitespace
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized(TOKEN_REQUIRED)),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))
    }
}
