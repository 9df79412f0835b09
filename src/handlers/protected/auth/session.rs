use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::TokenInfo;
use crate::state::AppState;

/// POST /auth/logout - Revoke the caller's sessions
pub async fn logout(State(state): State<AppState>, caller: AuthUser) -> ApiResult<()> {
    state.auth.logout(&caller.token).await?;
    Ok(ApiResponse::with_message((), "Logout successful"))
}

/// GET /auth/token-info - Describe the presented access token
///
/// Expected Output:
/// ```json
/// {
///   "status": "success",
///   "message": "Token info",
///   "data": {
///     "user": { "id": "...", "email": "a@x.com", "name": "Ann", "created_at": "..." },
///     "expires_at": 1700003600,
///     "expires_in": 1712
///   }
/// }
/// ```
///
/// `expires_at`/`expires_in` are read from the token payload and are 0 when
/// it cannot be decoded.
pub async fn token_info(State(state): State<AppState>, caller: AuthUser) -> ApiResult<TokenInfo> {
    let info = state.auth.token_info(&caller.token).await?;
    Ok(ApiResponse::with_message(info, "Token info"))
}
