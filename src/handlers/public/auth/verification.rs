use axum::extract::State;

use crate::api::{ValidJson, ValidQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::auth::{EmailRequest, VerifyEmailQuery};
use crate::models::Confirmation;
use crate::state::AppState;

/// GET /auth/verify-email?token=<token_hash> - Confirm an email address
///
/// The token hash comes from the link in the verification email.
pub async fn verify_email(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<VerifyEmailQuery>,
) -> ApiResult<Confirmation> {
    let confirmation = state.auth.verify_email(&query.token).await?;
    Ok(ApiResponse::with_message(confirmation, "Email verified"))
}

/// POST /auth/resend-verification - Send the verification email again
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<EmailRequest>,
) -> ApiResult<Confirmation> {
    let confirmation = state.auth.resend_verification(&request.email).await?;
    Ok(ApiResponse::with_message(confirmation, "Verification email resent"))
}
