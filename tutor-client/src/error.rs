//! Client error types

use reqwest::StatusCode;
use shared::ValidationError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed or incomplete input, detected locally or reported by the server
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Missing, expired or insufficient credentials (401/403)
    #[error("Authentication failed ({status}): {detail}")]
    Auth { status: StatusCode, detail: String },

    /// Referenced Support or Feedback does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempt to rebind or move a record backwards
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connectivity, timeout or body transfer failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other non-2xx reply
    #[error("Server error ({status}): {detail}")]
    Server { status: StatusCode, detail: String },

    /// 2xx reply whose body does not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Operation not allowed in the current wizard state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Chat linkage failed for reasons other than input or conflict
    #[error("Linking support {support_id} to chat {chat_id} failed: {source}")]
    Linkage {
        support_id: String,
        chat_id: String,
        status: Option<StatusCode>,
        #[source]
        source: Box<ClientError>,
    },

    /// Attachment upload failed
    #[error("Upload of '{filename}' to support {support_id} failed: {source}")]
    Upload {
        support_id: String,
        filename: String,
        #[source]
        source: Box<ClientError>,
    },

    /// Local file access
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status associated with this error, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Conflict(_) => Some(StatusCode::CONFLICT),
            Self::Http(e) => e.status(),
            Self::Linkage { status, .. } => *status,
            Self::Upload { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether resubmitting the same call may succeed
    ///
    /// Only transport failures and 5xx replies qualify. Validation, auth,
    /// not-found and conflict errors need the caller to change something first.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Server { status, .. } => status.is_server_error(),
            Self::Linkage { source, .. } | Self::Upload { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Upload { source, .. } | Self::Linkage { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Upload { source, .. } | Self::Linkage { source, .. } => source.is_conflict(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Upload { source, .. } | Self::Linkage { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Credentials need refreshing before a retry, wrapped or not
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Auth { .. } => true,
            Self::Upload { source, .. } | Self::Linkage { source, .. } => source.is_auth(),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
