use axum::extract::State;

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::auth::UpdateProfileRequest;
use crate::models::Identity;
use crate::state::AppState;

/// GET /auth/profile - Current account, fetched fresh from the provider
pub async fn profile_get(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Identity> {
    let profile = state.auth.get_profile(&caller.identity.id).await?;
    Ok(ApiResponse::with_message(profile, "Profile loaded"))
}

/// PUT /auth/profile - Change display name and/or password
///
/// Expected Input (both fields optional):
/// ```json
/// { "name": "Anna", "password": "new-secret" }
/// ```
pub async fn profile_put(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Identity> {
    let profile = state.auth.update_profile(&caller.identity.id, &request).await?;
    Ok(ApiResponse::with_message(profile, "Profile updated"))
}
