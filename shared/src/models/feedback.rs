//! Feedback Model (rating + response comparison)
//!
//! Both shapes travel in the same envelope: a `type` discriminator next to a
//! `data` object. Rating data uses snake_case keys; comparison data uses the
//! camelCase keys the chat UI emits.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::ValidationError;

pub const RATING_FEEDBACK_TYPE: &str = "rating";
pub const COMPARISON_FEEDBACK_TYPE: &str = "response_comparison";

/// Minimum number of candidate responses in a comparison
pub const MIN_COMPARISON_RESPONSES: usize = 2;

/// Single-response rating payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingData {
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

impl RatingData {
    pub fn new(rating: i32) -> Self {
        Self {
            rating,
            reason: None,
            comment: None,
            model_id: None,
        }
    }
}

/// Exchange a rating is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMeta {
    pub message_id: String,
    pub chat_id: String,
    pub model_id: String,
}

/// Rating submission as built by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RatingFeedback {
    pub data: RatingData,
    pub meta: FeedbackMeta,
    pub snapshot: Option<Value>,
}

/// One candidate answer in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparedResponse {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Preference among several responses to the same question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseComparisonFeedback {
    pub preferred_response_id: String,
    pub reason: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub question_id: String,
    pub question: String,
    pub responses: Vec<ComparedResponse>,
}

impl ResponseComparisonFeedback {
    /// At least two responses, unique ids, preferred id among them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.responses.len() < MIN_COMPARISON_RESPONSES {
            return Err(ValidationError::field(
                "responses",
                format!(
                    "a comparison needs at least {MIN_COMPARISON_RESPONSES} responses, got {}",
                    self.responses.len()
                ),
            ));
        }

        let mut seen = HashSet::with_capacity(self.responses.len());
        for response in &self.responses {
            if !seen.insert(response.id.as_str()) {
                return Err(ValidationError::field(
                    "responses",
                    format!("duplicate response id '{}'", response.id),
                ));
            }
        }

        if !seen.contains(self.preferred_response_id.as_str()) {
            return Err(ValidationError::field(
                "preferredResponseId",
                format!(
                    "preferred response '{}' is not one of the compared responses",
                    self.preferred_response_id
                ),
            ));
        }
        Ok(())
    }

    /// The response marked as preferred
    pub fn preferred(&self) -> Option<&ComparedResponse> {
        self.responses
            .iter()
            .find(|r| r.id == self.preferred_response_id)
    }
}

/// Typed feedback payload, tagged by `type` with its content under `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedbackBody {
    Rating(RatingData),
    ResponseComparison(ResponseComparisonFeedback),
}

impl FeedbackBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rating(_) => RATING_FEEDBACK_TYPE,
            Self::ResponseComparison(_) => COMPARISON_FEEDBACK_TYPE,
        }
    }
}

/// Submission envelope: `{type, data, meta, snapshot}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackForm {
    #[serde(flatten)]
    pub body: FeedbackBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

impl FeedbackForm {
    pub fn rating(feedback: RatingFeedback) -> Self {
        Self {
            body: FeedbackBody::Rating(feedback.data),
            meta: serde_json::to_value(feedback.meta).ok(),
            snapshot: feedback.snapshot,
        }
    }

    pub fn comparison(feedback: ResponseComparisonFeedback) -> Self {
        Self {
            body: FeedbackBody::ResponseComparison(feedback),
            meta: None,
            snapshot: None,
        }
    }
}

/// Author details attached by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Stored feedback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(flatten)]
    pub body: FeedbackBody,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub snapshot: Option<Value>,
    /// Epoch seconds
    pub created_at: i64,
    /// Epoch seconds
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<FeedbackUser>,
}

impl Feedback {
    pub fn as_rating(&self) -> Option<&RatingData> {
        match &self.body {
            FeedbackBody::Rating(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_comparison(&self) -> Option<&ResponseComparisonFeedback> {
        match &self.body {
            FeedbackBody::ResponseComparison(data) => Some(data),
            _ => None,
        }
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key)?.as_str()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.meta_str("message_id")
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.meta_str("chat_id")
    }

    /// Model the feedback is about: `data.model_id`, falling back to `meta.model_id`
    pub fn model_id(&self) -> Option<&str> {
        self.as_rating()
            .and_then(|r| r.model_id.as_deref())
            .or_else(|| self.meta_str("model_id"))
    }
}
