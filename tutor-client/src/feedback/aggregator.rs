//! Feedback Aggregator
//!
//! Read side of the evaluation store plus small reporting helpers that work
//! on already fetched records. Listings are whatever the backend returns at
//! call time; no caching or extra filtering happens here.

use std::collections::BTreeMap;

use shared::models::Feedback;
use shared::validation::normalize_id;

use crate::{ClientResult, HttpClient};

#[derive(Debug, Clone)]
pub struct FeedbackAggregator {
    http: HttpClient,
}

impl FeedbackAggregator {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Every feedback record visible to the caller, both shapes
    pub async fn list_all(&self) -> ClientResult<Vec<Feedback>> {
        let records: Vec<Feedback> = self.http.get("/evaluations/feedbacks/all").await?;
        tracing::debug!(count = records.len(), "Fetched feedback records");
        Ok(records)
    }

    /// Comparison records only
    pub async fn list_comparisons(&self) -> ClientResult<Vec<Feedback>> {
        self.http.get("/evaluations/response-feedbacks/all").await
    }

    /// One comparison record, or `NotFound`
    pub async fn get_by_id(&self, id: &str) -> ClientResult<Feedback> {
        let id = normalize_id(id, "feedback_id")?;
        self.http
            .get(&format!(
                "/evaluations/response-feedback/{}",
                urlencoding::encode(id)
            ))
            .await
    }
}

/// Rating statistics for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRating {
    pub count: usize,
    pub total: i64,
}

impl ModelRating {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Rating count and mean per model
///
/// Records without a model id are grouped under [`RatingSummary::UNKNOWN_MODEL`].
/// Comparison records are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSummary {
    models: BTreeMap<String, ModelRating>,
}

impl RatingSummary {
    pub const UNKNOWN_MODEL: &'static str = "unknown";

    pub fn from_feedbacks<'a>(records: impl IntoIterator<Item = &'a Feedback>) -> Self {
        let mut models: BTreeMap<String, ModelRating> = BTreeMap::new();
        for record in records {
            let Some(rating) = record.as_rating() else {
                continue;
            };
            let model = record.model_id().unwrap_or(Self::UNKNOWN_MODEL);
            let entry = models.entry(model.to_string()).or_insert(ModelRating {
                count: 0,
                total: 0,
            });
            entry.count += 1;
            entry.total += i64::from(rating.rating);
        }
        Self { models }
    }

    pub fn get(&self, model: &str) -> Option<&ModelRating> {
        self.models.get(model)
    }

    /// Models in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelRating)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn total_count(&self) -> usize {
        self.models.values().map(|m| m.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// How often each model produced the preferred response
///
/// Responses without a model name count under [`PreferenceTally::UNKNOWN_MODEL`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceTally {
    wins: BTreeMap<String, usize>,
    comparisons: usize,
}

impl PreferenceTally {
    pub const UNKNOWN_MODEL: &'static str = "unknown";

    pub fn from_feedbacks<'a>(records: impl IntoIterator<Item = &'a Feedback>) -> Self {
        let mut tally = Self::default();
        for comparison in records.into_iter().filter_map(Feedback::as_comparison) {
            // Malformed records (preferred id not among responses) are skipped.
            let Some(preferred) = comparison.preferred() else {
                continue;
            };
            let model = preferred
                .model_name
                .as_deref()
                .unwrap_or(Self::UNKNOWN_MODEL);
            *tally.wins.entry(model.to_string()).or_default() += 1;
            tally.comparisons += 1;
        }
        tally
    }

    pub fn wins(&self, model: &str) -> usize {
        self.wins.get(model).copied().unwrap_or(0)
    }

    /// Counted comparisons
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Model with the most wins; ties go to the name that sorts first
    pub fn leader(&self) -> Option<(&str, usize)> {
        self.wins
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (model, &wins)| match best {
                Some((_, top)) if top >= wins => best,
                _ => Some((model.as_str(), wins)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rating(id: &str, value: i32, model: Option<&str>) -> Feedback {
        serde_json::from_value(json!({
            "id": id,
            "user_id": "u1",
            "version": 0,
            "type": "rating",
            "data": {"rating": value},
            "meta": model.map(|m| json!({"message_id": "m", "chat_id": "c", "model_id": m})),
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap()
    }

    fn comparison(id: &str, preferred: &str) -> Feedback {
        serde_json::from_value(json!({
            "id": id,
            "user_id": "t1",
            "version": 0,
            "type": "response_comparison",
            "data": {
                "preferredResponseId": preferred,
                "reason": "",
                "timestamp": 0,
                "questionId": "q",
                "question": "?",
                "responses": [
                    {"id": "a", "content": "A", "modelName": "model-a"},
                    {"id": "b", "content": "B", "modelName": "model-b"},
                    {"id": "c", "content": "C"}
                ]
            },
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_rating_summary() {
        let records = vec![
            rating("f1", 1, Some("gpt-x")),
            rating("f2", -1, Some("gpt-x")),
            rating("f3", 5, Some("gpt-y")),
            rating("f4", 3, None),
            comparison("f5", "a"),
        ];
        let summary = RatingSummary::from_feedbacks(&records);

        let x = summary.get("gpt-x").unwrap();
        assert_eq!(x.count, 2);
        assert_eq!(x.mean(), 0.0);
        assert_eq!(summary.get("gpt-y").unwrap().mean(), 5.0);
        assert_eq!(summary.get(RatingSummary::UNKNOWN_MODEL).unwrap().count, 1);
        assert_eq!(summary.total_count(), 4);

        let names: Vec<_> = summary.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["gpt-x", "gpt-y", "unknown"]);
    }

    #[test]
    fn test_preference_tally() {
        let records = vec![
            comparison("f1", "b"),
            comparison("f2", "b"),
            comparison("f3", "a"),
            comparison("f4", "c"),
            comparison("f5", "zzz"),
            rating("f6", 4, Some("model-a")),
        ];
        let tally = PreferenceTally::from_feedbacks(&records);

        assert_eq!(tally.wins("model-b"), 2);
        assert_eq!(tally.wins("model-a"), 1);
        assert_eq!(tally.wins(PreferenceTally::UNKNOWN_MODEL), 1);
        assert_eq!(tally.comparisons(), 4);
        assert_eq!(tally.leader(), Some(("model-b", 2)));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(RatingSummary::from_feedbacks(&[]).is_empty());
        assert_eq!(PreferenceTally::from_feedbacks(&[]).leader(), None);
    }
}
