use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

const DEFAULT_MESSAGE: &str = "Request succeeded";

/// Wrapper for API responses that adds the success envelope
/// `{status: "success", message, data}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with the default message and 200 status
    pub fn success(data: T) -> Self {
        Self::with_message(data, DEFAULT_MESSAGE)
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(StatusCode::CREATED),
            ..Self::with_message(data, message)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value: Value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data").into_response();
            }
        };

        let envelope = json!({
            "status": "success",
            "message": self.message,
            "data": data_value,
        });

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_keeps_message() {
        let response = ApiResponse::created(json!({ "id": 1 }), "Customer created");
        assert_eq!(response.status_code, Some(StatusCode::CREATED));
        assert_eq!(response.message, "Customer created");

        let response = ApiResponse::success(());
        assert_eq!(response.status_code, None);
        assert_eq!(response.message, DEFAULT_MESSAGE);
    }
}
