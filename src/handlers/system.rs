use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - Service descriptor
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let records = if state.config.security.require_auth_for_records {
        "bearer"
    } else {
        "public"
    };

    Json(json!({
        "status": "success",
        "message": "CRM API",
        "data": {
            "name": "CRM API",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "endpoints": {
                "public_auth": "/auth/register, /auth/login, /auth/refresh, /auth/reset-password, /auth/verify-email, /auth/resend-verification (public)",
                "auth": "/auth/logout, /auth/profile, /auth/token-info (bearer)",
                "user_settings": "/user-settings (bearer)",
                "customers": format!("/customers[/:id] ({})", records),
                "contracts": format!("/contracts[/:id] ({})", records),
                "health": "/health (public)",
            }
        }
    }))
}

/// GET /health - Provider reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.identity.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "ok",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "provider": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "message": "provider unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "provider": "unreachable"
                    }
                })),
            )
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {} {}", method, uri.path()))
}
