//! Client configuration
//!
//! Everything a component needs is passed in explicitly; nothing is read
//! from process-wide state after construction.
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | TUTOR_API_BASE_URL | http://localhost:8080/api/v1 | Supports API |
//! | WEBUI_API_BASE_URL | same as TUTOR_API_BASE_URL | Evaluations API |
//! | TUTOR_API_TOKEN | (none) | Bearer token |
//! | TUTOR_API_TIMEOUT_SECS | 30 | Request timeout |

use crate::{ClientError, ClientResult, TutorClient};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for connecting to the tutoring backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the supports API (e.g., "http://localhost:8080/api/v1")
    pub base_url: String,

    /// Base URL of the evaluations API; falls back to `base_url`
    pub evaluations_base_url: Option<String>,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            evaluations_base_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("TUTOR_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/v1".into());
        let timeout = match std::env::var("TUTOR_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("TUTOR_API_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url,
            evaluations_base_url: std::env::var("WEBUI_API_BASE_URL").ok(),
            token: std::env::var("TUTOR_API_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the evaluations API base URL
    pub fn with_evaluations_base_url(mut self, url: impl Into<String>) -> Self {
        self.evaluations_base_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Base URL used for evaluation endpoints
    pub fn evaluations_url(&self) -> &str {
        self.evaluations_base_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Reject configurations that cannot produce a working client
    pub fn validate(&self) -> ClientResult<()> {
        let urls = [
            ("base_url", self.base_url.as_str()),
            ("evaluations_base_url", self.evaluations_url()),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ClientError::Config(format!(
                    "{name} must start with http:// or https://, got '{url}'"
                )));
            }
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }

    /// Create a client from this configuration
    pub fn build(&self) -> ClientResult<TutorClient> {
        TutorClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api/v1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://localhost:9000/api")
            .with_token("secret")
            .with_timeout(5);
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.evaluations_url(), "http://localhost:9000/api");

        let config = config.with_evaluations_base_url("http://localhost:9000/webui");
        assert_eq!(config.evaluations_url(), "http://localhost:9000/webui");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let err = ClientConfig::new("localhost:9000").validate().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = ClientConfig::default().with_timeout(0).validate().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
