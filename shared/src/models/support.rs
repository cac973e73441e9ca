//! Support Model (tutoring request)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::validation::{
    MAX_LONG_TEXT_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, validate_date_range,
    validate_optional_text, validate_required_text,
};

/// Subjects offered by the creation form. Anything else goes through [`OTHER_SUBJECT`].
pub const SUBJECT_CATALOG: &[&str] = &[
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "History",
    "Geography",
    "Literature",
    "Languages",
    "Economics",
    "Philosophy",
    "Arts",
];

/// Subject value that requires `custom_subject`
pub const OTHER_SUBJECT: &str = "Other";

/// Returns true if `subject` is a catalog entry or [`OTHER_SUBJECT`]
pub fn is_known_subject(subject: &str) -> bool {
    subject == OTHER_SUBJECT || SUBJECT_CATALOG.contains(&subject)
}

/// Keywords as a set: trimmed, blanks dropped, case-insensitive duplicates
/// removed keeping the first spelling and order of appearance.
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.as_ref().trim();
        if keyword.is_empty() || kept.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            continue;
        }
        kept.push(keyword.to_string());
    }
    kept
}

/// Support lifecycle status
///
/// Moves forward only: `draft → active → completed`, with `archived`
/// reachable from any non-archived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Archived,
}

impl SupportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Whether `self -> next` is a permitted forward transition
    pub fn can_transition_to(self, next: SupportStatus) -> bool {
        use SupportStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Archived)
                | (Active, Completed)
                | (Active, Archived)
                | (Completed, Archived)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            other => Err(ValidationError::field(
                "status",
                format!("unknown support status '{other}'"),
            )),
        }
    }
}

/// Support entity as persisted by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub subject: String,
    pub custom_subject: Option<String>,
    pub course_id: Option<String>,
    pub learning_objective: Option<String>,
    pub learning_type: Option<String>,
    pub level: Option<String>,
    pub content_language: Option<String>,
    pub estimated_duration: Option<String>,
    pub access_type: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub avatar_id: Option<String>,
    pub status: SupportStatus,
    pub chat_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Outcome of binding a chat to a Support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBinding {
    /// The chat id was recorded now
    Bound,
    /// The same chat id was already recorded; nothing changed
    AlreadyBound,
}

/// Attempt to rebind a Support to a different chat
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("support {support_id} is already linked to chat {existing}, refusing {requested}")]
pub struct ChatConflict {
    pub support_id: String,
    pub existing: String,
    pub requested: String,
}

/// Backward or otherwise disallowed status change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move support {support_id} from {from} to {to}")]
pub struct StatusConflict {
    pub support_id: String,
    pub from: SupportStatus,
    pub to: SupportStatus,
}

impl Support {
    /// Build a new record from a create request
    ///
    /// Applies the backend defaults (`content_language`, `access_type`) and
    /// starts as `active` when a chat id was bundled, `draft` otherwise.
    pub fn from_request(
        id: impl Into<String>,
        user_id: impl Into<String>,
        req: SupportCreateRequest,
        now: NaiveDateTime,
    ) -> Self {
        let chat_id = req
            .chat_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let status = if chat_id.is_some() {
            SupportStatus::Active
        } else {
            SupportStatus::Draft
        };

        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: req.title,
            short_description: req.short_description,
            subject: req.subject,
            custom_subject: req.custom_subject,
            course_id: req.course_id,
            learning_objective: req.learning_objective,
            learning_type: req.learning_type,
            level: req.level,
            content_language: req.content_language.or_else(|| Some("English".to_string())),
            estimated_duration: req.estimated_duration,
            access_type: req.access_type.or_else(|| Some("Private".to_string())),
            keywords: req
                .keywords
                .map(|k| normalize_keywords(&k))
                .filter(|k| !k.is_empty()),
            start_date: req.start_date,
            end_date: req.end_date,
            avatar_id: req.avatar_id,
            status,
            chat_id,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// Bind this Support to a chat session
    ///
    /// The chat id is set at most once. Repeating the same id is a no-op;
    /// a different id is a [`ChatConflict`]. A fresh binding moves `draft`
    /// to `active`.
    pub fn bind_chat(
        &mut self,
        chat_id: &str,
        now: NaiveDateTime,
    ) -> Result<ChatBinding, ChatConflict> {
        match self.chat_id.as_deref() {
            Some(existing) if existing == chat_id => Ok(ChatBinding::AlreadyBound),
            Some(existing) => Err(ChatConflict {
                support_id: self.id.clone(),
                existing: existing.to_string(),
                requested: chat_id.to_string(),
            }),
            None => {
                self.chat_id = Some(chat_id.to_string());
                if self.status == SupportStatus::Draft {
                    self.status = SupportStatus::Active;
                }
                self.updated_at = Some(now);
                Ok(ChatBinding::Bound)
            }
        }
    }

    /// Advance the lifecycle status. Setting the current status again is a no-op.
    pub fn advance_status(
        &mut self,
        next: SupportStatus,
        now: NaiveDateTime,
    ) -> Result<bool, StatusConflict> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(StatusConflict {
                support_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Some(now);
        Ok(true)
    }

    /// Subject as shown to users (`custom_subject` when subject is "Other")
    pub fn display_subject(&self) -> &str {
        match (self.subject.as_str(), self.custom_subject.as_deref()) {
            (OTHER_SUBJECT, Some(custom)) if !custom.trim().is_empty() => custom,
            (subject, _) => subject,
        }
    }
}

/// Create support payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportCreateRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    /// Chat session started together with the Support, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl SupportCreateRequest {
    /// Create-time invariants: non-empty title and subject, sane lengths,
    /// `custom_subject` for "Other", ordered scheduling bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required_text(&self.title, "title", MAX_TITLE_LEN)?;
        validate_required_text(&self.subject, "subject", MAX_SHORT_TEXT_LEN)?;
        if !is_known_subject(&self.subject) {
            return Err(ValidationError::field(
                "subject",
                format!(
                    "'{}' is not in the subject catalog; use {OTHER_SUBJECT} with a custom subject",
                    self.subject
                ),
            ));
        }
        if self.subject == OTHER_SUBJECT {
            validate_required_text(
                self.custom_subject.as_deref().unwrap_or_default(),
                "custom_subject",
                MAX_SHORT_TEXT_LEN,
            )?;
        }
        validate_optional_text(
            self.short_description.as_deref(),
            "short_description",
            MAX_SHORT_TEXT_LEN,
        )?;
        validate_optional_text(
            self.learning_objective.as_deref(),
            "learning_objective",
            MAX_LONG_TEXT_LEN,
        )?;
        validate_date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Reply of `PATCH /supports/{id}/update-chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLinkResponse {
    pub id: String,
    pub chat_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply of `PATCH /supports/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub id: String,
    pub status: SupportStatus,
    pub updated_at: Option<NaiveDateTime>,
}

/// Attachment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportFile {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub support_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc()
    }

    fn later() -> NaiveDateTime {
        chrono::DateTime::from_timestamp(1_700_000_600, 0)
            .unwrap()
            .naive_utc()
    }

    fn request() -> SupportCreateRequest {
        SupportCreateRequest {
            title: "Understanding Linear Equations".to_string(),
            subject: "Mathematics".to_string(),
            learning_objective: Some("Solve linear equations".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_forward_only() {
        use SupportStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Archived));
        assert!(Completed.can_transition_to(Archived));
        assert!(!Active.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Archived.can_transition_to(Completed));
        assert!(!Draft.can_transition_to(Completed));
        assert!(Archived.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&SupportStatus::Active).unwrap(), "\"active\"");
        assert_eq!("completed".parse::<SupportStatus>().unwrap(), SupportStatus::Completed);
        assert!("pending".parse::<SupportStatus>().is_err());
    }

    #[test]
    fn test_from_request_defaults() {
        let support = Support::from_request("s1", "u1", request(), now());
        assert_eq!(support.status, SupportStatus::Draft);
        assert_eq!(support.chat_id, None);
        assert_eq!(support.content_language.as_deref(), Some("English"));
        assert_eq!(support.access_type.as_deref(), Some("Private"));
        assert_eq!(support.created_at, now());
    }

    #[test]
    fn test_from_request_with_bundled_chat() {
        let req = SupportCreateRequest {
            chat_id: Some(" chat-1 ".to_string()),
            ..request()
        };
        let support = Support::from_request("s1", "u1", req, now());
        assert_eq!(support.status, SupportStatus::Active);
        assert_eq!(support.chat_id.as_deref(), Some("chat-1"));
    }

    #[test]
    fn test_bind_chat_once() {
        let mut support = Support::from_request("s1", "u1", request(), now());

        assert_eq!(support.bind_chat("chat-42", later()), Ok(ChatBinding::Bound));
        assert_eq!(support.status, SupportStatus::Active);
        assert_eq!(support.updated_at, Some(later()));

        assert_eq!(
            support.bind_chat("chat-42", now()),
            Ok(ChatBinding::AlreadyBound)
        );
        // idempotent repeat does not touch the timestamp
        assert_eq!(support.updated_at, Some(later()));

        let err = support.bind_chat("chat-43", now()).unwrap_err();
        assert_eq!(err.existing, "chat-42");
        assert_eq!(err.requested, "chat-43");
        assert_eq!(support.chat_id.as_deref(), Some("chat-42"));
    }

    #[test]
    fn test_bind_chat_keeps_later_status() {
        let mut support = Support::from_request("s1", "u1", request(), now());
        support.status = SupportStatus::Completed;
        support.bind_chat("chat-1", later()).unwrap();
        assert_eq!(support.status, SupportStatus::Completed);
    }

    #[test]
    fn test_advance_status() {
        let mut support = Support::from_request("s1", "u1", request(), now());
        assert_eq!(support.advance_status(SupportStatus::Draft, later()), Ok(false));
        assert_eq!(support.advance_status(SupportStatus::Active, later()), Ok(true));
        assert_eq!(support.advance_status(SupportStatus::Completed, later()), Ok(true));

        let err = support
            .advance_status(SupportStatus::Active, later())
            .unwrap_err();
        assert_eq!(err.from, SupportStatus::Completed);
        assert_eq!(err.to, SupportStatus::Active);
        assert_eq!(support.status, SupportStatus::Completed);
    }

    #[test]
    fn test_request_validation() {
        assert!(request().validate().is_ok());

        let err = SupportCreateRequest {
            title: "  ".to_string(),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field_name(), Some("title"));

        let err = SupportCreateRequest {
            subject: OTHER_SUBJECT.to_string(),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field_name(), Some("custom_subject"));

        let err = SupportCreateRequest {
            start_date: Some("2025-03-01".to_string()),
            end_date: Some("2025-02-01".to_string()),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field_name(), Some("end_date"));
    }

    #[test]
    fn test_request_skips_unset_fields() {
        let json = serde_json::to_value(request()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("title"));
        assert!(obj.contains_key("learning_objective"));
        assert!(!obj.contains_key("chat_id"));
        assert!(!obj.contains_key("keywords"));
    }

    #[test]
    fn test_support_parses_backend_timestamps() {
        let json = serde_json::json!({
            "id": "s1",
            "user_id": "u1",
            "title": "Algebra",
            "short_description": null,
            "subject": "Mathematics",
            "custom_subject": null,
            "course_id": null,
            "learning_objective": null,
            "learning_type": null,
            "level": null,
            "content_language": "English",
            "estimated_duration": null,
            "access_type": "Private",
            "keywords": ["algebra", "equations"],
            "start_date": null,
            "end_date": null,
            "avatar_id": null,
            "status": "draft",
            "chat_id": null,
            "created_at": "2025-01-15T10:30:00.123456",
            "updated_at": null
        });
        let support: Support = serde_json::from_value(json).unwrap();
        assert_eq!(support.status, SupportStatus::Draft);
        assert_eq!(support.keywords.unwrap().len(), 2);
        assert!(support.updated_at.is_none());
    }

    #[test]
    fn test_display_subject() {
        let mut support = Support::from_request("s1", "u1", request(), now());
        assert_eq!(support.display_subject(), "Mathematics");
        support.subject = OTHER_SUBJECT.to_string();
        support.custom_subject = Some("Astronomy".to_string());
        assert_eq!(support.display_subject(), "Astronomy");
    }

    #[test]
    fn test_request_rejects_uncatalogued_subject() {
        let err = SupportCreateRequest {
            subject: "Underwater Basket Weaving".to_string(),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field_name(), Some("subject"));

        let other = SupportCreateRequest {
            subject: OTHER_SUBJECT.to_string(),
            custom_subject: Some("Underwater Basket Weaving".to_string()),
            ..request()
        };
        assert!(other.validate().is_ok());
    }

    #[test]
    fn test_keywords_stored_as_set() {
        assert_eq!(
            normalize_keywords(&["algebra", "Algebra", "  ", " equations ", "x", "x"]),
            vec!["algebra", "equations", "x"]
        );

        let support = Support::from_request(
            "s1",
            "u1",
            SupportCreateRequest {
                keywords: Some(vec!["x".to_string(), "x".to_string()]),
                ..request()
            },
            now(),
        );
        assert_eq!(support.keywords, Some(vec!["x".to_string()]));

        let support = Support::from_request(
            "s2",
            "u1",
            SupportCreateRequest {
                keywords: Some(vec!["  ".to_string()]),
                ..request()
            },
            now(),
        );
        assert_eq!(support.keywords, None);
    }

    #[test]
    fn test_subject_catalog() {
        assert!(is_known_subject("Mathematics"));
        assert!(is_known_subject(OTHER_SUBJECT));
        assert!(!is_known_subject("mathematics"));
    }
}
