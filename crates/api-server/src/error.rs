use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use serde_json::json;
use std::any::Any;

/// Failures of the request handler itself. Provider failures never reach
/// this type; they are folded into the context as degraded entries.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request timed out")]
    Timeout,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = %status, error = %self, "Request failed");

        let body = Json(json!({
            "status": "error",
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Maps errors from the router's `tower::timeout` layer
pub async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal(err.to_string())
    }
}

pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(detail).into_response()
}
