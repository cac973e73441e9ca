//! Feedback Collector
//!
//! Write side of the evaluation store. Records are immutable once created and
//! nothing is de-duplicated: submitting the same rating twice stores two
//! records, so callers that need exactly-once must track what they sent.

use shared::models::{Feedback, FeedbackForm, RatingFeedback, ResponseComparisonFeedback};

use crate::{ClientResult, HttpClient};

#[derive(Debug, Clone)]
pub struct FeedbackCollector {
    http: HttpClient,
}

impl FeedbackCollector {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Store a single-response rating
    pub async fn submit_rating(&self, feedback: RatingFeedback) -> ClientResult<Feedback> {
        let message_id = feedback.meta.message_id.clone();
        let form = FeedbackForm::rating(feedback);

        let stored: Feedback = self.http.post("/evaluations/feedback", &form).await?;
        tracing::info!(feedback_id = %stored.id, %message_id, "Rating feedback stored");
        Ok(stored)
    }

    /// Store a multi-response comparison
    ///
    /// Rejected locally, without a request, when fewer than two responses are
    /// given, response ids repeat, or the preferred id is not among them.
    pub async fn submit_comparison(
        &self,
        feedback: ResponseComparisonFeedback,
    ) -> ClientResult<Feedback> {
        feedback.validate()?;

        let question_id = feedback.question_id.clone();
        let form = FeedbackForm::comparison(feedback);
        let stored: Feedback = self
            .http
            .post("/evaluations/response-feedback", &form)
            .await?;
        tracing::info!(feedback_id = %stored.id, %question_id, "Comparison feedback stored");
        Ok(stored)
    }
}
