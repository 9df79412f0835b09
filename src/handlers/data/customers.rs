use axum::extract::{Path, State};

use crate::api::ValidJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{CreateCustomer, Customer, UpdateCustomer};
use crate::state::AppState;

/// GET /customers
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    Ok(ApiResponse::success(state.customers.find_all().await?))
}

/// GET /customers/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Customer> {
    Ok(ApiResponse::success(state.customers.find_one(&id).await?))
}

/// POST /customers
///
/// Expected Input:
/// ```json
/// {
///   "name": "Kim Minji",
///   "phone": "010-1234-5678",
///   "birth_date": "1990-05-17",
///   "signup_date": "2024-01-02",
///   "maturity_date": "2026-01-02",
///   "auto_payment": true,
///   "memo": "prefers evening calls"
/// }
/// ```
pub async fn create(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateCustomer>,
) -> ApiResult<Customer> {
    let customer = state.customers.create(&payload).await?;
    Ok(ApiResponse::created(customer, "Customer created"))
}

/// PUT /customers/:id - Any subset of the create fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateCustomer>,
) -> ApiResult<Customer> {
    let customer = state.customers.update(&id, &payload).await?;
    Ok(ApiResponse::with_message(customer, "Customer updated"))
}

/// DELETE /customers/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.customers.remove(&id).await?;
    Ok(ApiResponse::with_message((), "Customer deleted"))
}
