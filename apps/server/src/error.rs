//! HTTP error mapping and the response envelope.
//!
//! Every response body has the same shape: `{"success": true, "data": ...}`
//! on the happy path, `{"success": false, "error": {...}}` otherwise.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use adsync_core::{DatabaseError, Error};
use adsync_platforms::PlatformError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Success envelope. Handlers return `ApiJson(value)` instead of `Json(value)`.
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(json!({ "success": true, "data": self.0 })).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        ApiError {
            status,
            code,
            message,
            suggestions: Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, "{}", self.message);
        }
        let mut error = json!({ "code": self.code, "message": self.message });
        if !self.suggestions.is_empty() {
            error["suggestions"] = json!(self.suggestions);
        }
        (self.status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(e) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            Error::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Error::Database(DatabaseError::NotFound(msg)) => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            Error::RateLimitExceeded(msg) => {
                ApiError::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED", msg)
            }
            Error::Platform(e) => ApiError::from(e),
            Error::MissingConfigKey(key) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                format!("Missing configuration: {}", key),
            ),
            Error::ConfigIO(msg) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                other.to_string(),
            ),
        }
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::InvalidCredentials { .. } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                err.to_string(),
            ),
            PlatformError::AuthenticationFailed { .. } => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                err.to_string(),
            ),
            PlatformError::RateLimited { .. } => ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "PLATFORM_RATE_LIMITED",
                err.to_string(),
            ),
            PlatformError::Api {
                platform,
                message,
                suggestions,
            } => ApiError {
                status: StatusCode::BAD_GATEWAY,
                code: "PLATFORM_ERROR",
                message: format!("{}: {}", platform.display_name(), message),
                suggestions,
            },
            PlatformError::Timeout { .. } | PlatformError::Network(_) => ApiError::new(
                StatusCode::BAD_GATEWAY,
                "PLATFORM_UNAVAILABLE",
                err.to_string(),
            ),
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                other.to_string(),
            ),
        }
    }
}
