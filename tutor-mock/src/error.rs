//! Error mapping
//!
//! Every failure leaves the mock as `{"detail": "..."}` with the status code
//! the client maps back onto its own error taxonomy.
//!
//! | Variant | Status |
//! |---------|--------|
//! | Unauthorized | 401 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | Conflict | 409 |
//! | Invalid | 400 |
//! | Validation | 422 |
//! | Internal | 500 |

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::{ErrorBody, ValidationError};
use shared::models::{ChatConflict, StatusConflict};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::Unauthorized => "Not authenticated".to_string(),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error occurred");
                msg
            }
            Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Invalid(msg)
            | Self::Validation(msg) => msg,
        };

        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.message)
    }
}

impl From<ChatConflict> for AppError {
    fn from(e: ChatConflict) -> Self {
        Self::Conflict(e.to_string())
    }
}

impl From<StatusConflict> for AppError {
    fn from(e: StatusConflict) -> Self {
        Self::Conflict(e.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::Invalid(format!("Multipart error: {}", e))
    }
}

pub type AppResult<T> = Result<T, AppError>;
