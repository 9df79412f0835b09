use axum::extract::State;

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::auth::{EmailRequest, RegisterRequest};
use crate::models::AuthResponse;
use crate::state::AppState;

/// POST /auth/register - Create an account
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "pw123456", "name": "Ann" }
/// ```
///
/// Expected Output when email verification is required:
/// ```json
/// {
///   "status": "success",
///   "message": "Registration successful",
///   "data": {
///     "user": { "id": "...", "email": "a@x.com", "name": "Ann", "created_at": "..." },
///     "access_token": null,
///     "refresh_token": null,
///     "needEmailVerification": true
///   }
/// }
/// ```
///
/// When the provider signs the account in straight away both tokens are set
/// and `needEmailVerification` is false. An address already on file answers
/// 409.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let outcome = state.auth.register(&request).await?;
    Ok(ApiResponse::created(AuthResponse::from(outcome), "Registration successful"))
}

/// POST /auth/reset-password - Email a password reset link
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<EmailRequest>,
) -> ApiResult<()> {
    state.auth.reset_password(&request.email).await?;
    Ok(ApiResponse::with_message((), "Password reset email sent"))
}
