//! Error-to-response conversion.
//!
//! Handlers return `Result<_, ApiError>` and propagate with `?`; every failure
//! is rendered here as `{"success": false, "error": "..."}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bootcamp::BootcampError;

use crate::handlers::ErrorResponse;

/// A failed request: status code plus client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<BootcampError> for ApiError {
    fn from(err: BootcampError) -> Self {
        let status = match &err {
            BootcampError::NotFound { .. } | BootcampError::GeocodeNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            BootcampError::Validation { .. } | BootcampError::Duplicate { .. } => {
                StatusCode::BAD_REQUEST
            }
            BootcampError::Geocoder { .. } => StatusCode::BAD_GATEWAY,
            BootcampError::Io(_) | BootcampError::Serialization(_) | BootcampError::Poisoned => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };
        Self::new(status, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "Request rejected");
        }

        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}
