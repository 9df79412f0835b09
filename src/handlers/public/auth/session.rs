use axum::extract::State;

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::auth::{LoginRequest, RefreshTokenRequest};
use crate::models::{AuthResponse, Session};
use crate::state::AppState;

/// POST /auth/login - Exchange credentials for a session
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "pw123456" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "status": "success",
///   "message": "Login successful",
///   "data": {
///     "user": { "id": "...", "email": "a@x.com", "name": "Ann", "created_at": "...", "last_sign_in_at": "..." },
///     "access_token": "eyJhbGciOi...",
///     "refresh_token": "v1.Mr5...",
///     "expires_at": 1700003600,
///     "expires_in": 3600
///   }
/// }
/// ```
///
/// Wrong password and unknown email both answer 401 "Invalid email or password".
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let (user, session) = state.auth.login(&request).await?;
    Ok(ApiResponse::with_message(
        AuthResponse::signed_in(user, session),
        "Login successful",
    ))
}

/// POST /auth/refresh - Trade a refresh token for a new session
///
/// Expected Input:
/// ```json
/// { "refresh_token": "v1.Mr5..." }
/// ```
///
/// The old refresh token is consumed; reuse answers 401.
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RefreshTokenRequest>,
) -> ApiResult<Session> {
    let session = state.auth.refresh(&request.refresh_token).await?;
    Ok(ApiResponse::with_message(session, "Token refreshed"))
}
