use std::any::Any;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::error::ApiError;

/// Global fault boundary. Every `ApiError` response is re-rendered with the
/// request path so clients always get the same error shape.
pub async fn fault_boundary(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(error) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), error = %error, "request failed");
    } else {
        tracing::debug!(%method, %path, status = status.as_u16(), error = %error, "request rejected");
    }

    (status, Json(error.to_json(&path))).into_response()
}

/// Panic handler for `CatchPanicLayer`; details stay in the log.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    ApiError::internal_server_error("Internal server error").into_response()
}
