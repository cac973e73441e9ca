//! Tutor Client - HTTP client for the tutoring backend
//!
//! Covers the Support Session lifecycle: the creation wizard, Support store
//! access, chat linkage, attachment uploads and feedback collection.
//!
//! ```no_run
//! # async fn run() -> tutor_client::ClientResult<()> {
//! use tutor_client::ClientConfig;
//!
//! let client = ClientConfig::new("http://localhost:8080/api/v1")
//!     .with_token("token")
//!     .build()?;
//!
//! let mut wizard = client.wizard();
//! wizard.draft_mut().title = "Understanding Linear Equations".into();
//! wizard.draft_mut().subject = Some("Mathematics".into());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod http;
pub mod support;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

pub use feedback::{FeedbackAggregator, FeedbackCollector, PreferenceTally, RatingSummary};
pub use support::{
    Advance, AttachmentHandler, LinkageService, SupportApi, SupportDraft, SupportRepository,
    SupportUpload, SupportWizard, WizardState, WizardStep,
};

// Re-export shared types for convenience
pub use shared::ValidationError;
pub use shared::models::{
    ChatLinkResponse, ComparedResponse, Feedback, FeedbackBody, FeedbackMeta, RatingData,
    RatingFeedback, ResponseComparisonFeedback, StatusUpdateResponse, Support,
    SupportCreateRequest, SupportFile, SupportStatus,
};

/// Entry point handing out the per-concern services
///
/// Cloning is cheap; every service shares the same connection pool.
#[derive(Debug, Clone)]
pub struct TutorClient {
    supports: HttpClient,
    evaluations: HttpClient,
}

impl TutorClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let supports = HttpClient::new(&config.base_url, config.token.clone(), config.timeout)?;
        let evaluations = supports.with_base_url(config.evaluations_url());
        tracing::debug!(
            base_url = supports.base_url(),
            evaluations_url = evaluations.base_url(),
            "Tutor client configured"
        );

        Ok(Self {
            supports,
            evaluations,
        })
    }

    pub fn supports(&self) -> SupportApi {
        SupportApi::new(self.supports.clone())
    }

    /// A fresh wizard with an empty draft
    pub fn wizard(&self) -> SupportWizard<SupportApi> {
        SupportWizard::new(self.supports())
    }

    pub fn linkage(&self) -> LinkageService<SupportApi> {
        LinkageService::new(self.supports())
    }

    pub fn attachments(&self) -> AttachmentHandler {
        AttachmentHandler::new(self.supports.clone())
    }

    pub fn feedback(&self) -> FeedbackCollector {
        FeedbackCollector::new(self.evaluations.clone())
    }

    pub fn reports(&self) -> FeedbackAggregator {
        FeedbackAggregator::new(self.evaluations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluations_fall_back_to_base_url() {
        let client = ClientConfig::new("http://localhost:8080/api/v1")
            .build()
            .unwrap();
        assert_eq!(client.evaluations.base_url(), "http://localhost:8080/api/v1");

        let client = ClientConfig::new("http://localhost:8080/api/v1")
            .with_evaluations_base_url("http://localhost:3000/api/v1")
            .with_token("tok")
            .build()
            .unwrap();
        assert_eq!(client.evaluations.base_url(), "http://localhost:3000/api/v1");
        assert_eq!(client.evaluations.token(), Some("tok"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = ClientConfig::new("ftp://nowhere").build().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
