use axum::extract::State;

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{UpdateUserSettings, UserSettings};
use crate::state::AppState;

/// GET /user-settings - Notification preferences of the caller
pub async fn settings_get(State(state): State<AppState>, caller: AuthUser) -> ApiResult<UserSettings> {
    tracing::debug!(user_id = %caller.identity.id, "user settings requested");
    let settings = state.settings.get(&caller.identity.id).await?;
    Ok(ApiResponse::with_message(settings, "User settings loaded"))
}

/// PUT /user-settings - Partial update; omitted fields keep their value
///
/// Expected Input (any subset):
/// ```json
/// { "notify_signup": true, "notify_maturity": false, "notify_birthday": true, "preferred_channel": "sms" }
/// ```
pub async fn settings_put(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidJson(patch): ValidJson<UpdateUserSettings>,
) -> ApiResult<UserSettings> {
    let settings = state.settings.update(&caller.identity.id, &patch).await?;
    Ok(ApiResponse::with_message(settings, "User settings updated"))
}
