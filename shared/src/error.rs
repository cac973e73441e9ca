//! Error envelope and validation error
//!
//! The backend reports every non-2xx response as a JSON object with a
//! `detail` field. `detail` is usually a string, but request-shape failures
//! (422) carry a list of structured entries, so it is kept as a raw value
//! and rendered to text on demand.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the backend: `{"detail": ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub detail: Value,
}

impl ErrorBody {
    /// Create an error body with a plain string detail
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    /// Render the detail as human-readable text
    ///
    /// Strings are returned as-is, structured details are joined from their
    /// `msg` entries when present, anything else falls back to compact JSON.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let msgs: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                if msgs.is_empty() {
                    self.detail.to_string()
                } else {
                    msgs.join("; ")
                }
            }
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Error category derived from an HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400 / 422
    Validation,
    /// 401 / 403
    Auth,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// Everything else (5xx, unexpected 4xx)
    Server,
}

impl ErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::Conflict,
            _ => Self::Server,
        }
    }
}

/// Malformed or incomplete input
///
/// `field` names the first unmet requirement when the failure was detected
/// locally; errors relayed from the server usually have no field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Returns the offending field name, if known
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref()
    }
}
