use axum::extract::{Path, State};

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Contract, CreateContract, UpdateContract};
use crate::state::AppState;

/// GET /contracts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Contract>> {
    Ok(ApiResponse::success(state.contracts.find_all().await?))
}

/// GET /contracts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Contract> {
    Ok(ApiResponse::success(state.contracts.find_one(&id).await?))
}

/// POST /contracts
///
/// Expected Input:
/// ```json
/// { "customerId": "3f0c...", "details": "24 month savings plan" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateContract>,
) -> ApiResult<Contract> {
    let contract = state.contracts.create(&payload).await?;
    Ok(ApiResponse::created(contract, "Contract created"))
}

/// PATCH /contracts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateContract>,
) -> ApiResult<Contract> {
    let contract = state.contracts.update(&id, &payload).await?;
    Ok(ApiResponse::with_message(contract, "Contract updated"))
}

/// DELETE /contracts/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.contracts.remove(&id).await?;
    Ok(ApiResponse::with_message((), "Contract deleted"))
}
