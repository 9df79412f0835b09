// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::provider::{ProviderError, ProviderErrorKind};
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (identity provider / table API issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Reason phrase used as the `error` field
    pub fn error_name(&self) -> &'static str {
        self.status_code().canonical_reason().unwrap_or("Error")
    }

    /// Convert to the JSON error body served for `path`
    pub fn to_json(&self, path: &str) -> Value {
        let mut body = json!({
            "statusCode": self.status_code().as_u16(),
            "timestamp": Utc::now().to_rfc3339(),
            "path": path,
            "error": self.error_name(),
            "message": self.message(),
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            body["errors"] = json!(field_errors);
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<BTreeMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err.kind() {
            ProviderErrorKind::Unavailable => {
                // Log the real error but return generic message
                tracing::error!(error = %err, "provider call failed");
                ApiError::bad_gateway("Upstream service unavailable")
            }
            ProviderErrorKind::RateLimited => ApiError::too_many_requests(err.message()),
            ProviderErrorKind::NotFound => ApiError::not_found(err.message()),
            ProviderErrorKind::AlreadyRegistered => ApiError::conflict(err.message()),
            ProviderErrorKind::InvalidCredentials | ProviderErrorKind::InvalidToken => {
                ApiError::unauthorized(err.message())
            }
            ProviderErrorKind::Rejected => {
                tracing::warn!(error = %err, "provider rejected request");
                ApiError::bad_request(err.message())
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::InvalidRequest(msg) => ApiError::bad_request(msg),
            ServiceError::Provider(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum. The fault boundary re-renders
// the body with the request path using the error left in the extensions.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_json(""))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_has_stable_shape() {
        let body = ApiError::unauthorized("Token required").to_json("/auth/profile");
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["path"], "/auth/profile");
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Token required");
        assert!(body["timestamp"].is_string());
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn validation_errors_list_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "must be a valid email address".to_string());
        let body = ApiError::validation_error("Validation failed", Some(fields)).to_json("/auth/login");
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["errors"]["email"], "must be a valid email address");
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServiceError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::Provider(ProviderError::Decode("garbled".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn upstream_detail_is_not_echoed() {
        let err = ApiError::from(ProviderError::Decode("secret upstream detail".into()));
        assert_eq!(err.message(), "Upstream service unavailable");
    }
}
