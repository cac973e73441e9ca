//! In-memory store backing the mock endpoints
//!
//! Supports live in a [`DashMap`]; mutations go through `get_mut`, which
//! holds the shard lock for the whole check-and-set, so two concurrent
//! linkage requests for the same Support cannot both win.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{NaiveDateTime, Utc};
use dashmap::DashMap;
use shared::models::{
    ChatBinding, Feedback, FeedbackBody, FeedbackForm, FeedbackUser, Role, Support,
    SupportCreateRequest, SupportFile, SupportStatus,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct MockUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl MockUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            email: format!("{id}@example.com"),
            id,
            role,
        }
    }
}

struct StoredSupport {
    seq: u64,
    support: Support,
}

pub struct MockState {
    users: HashMap<String, MockUser>,
    supports: DashMap<String, StoredSupport>,
    files: DashMap<String, SupportFile>,
    feedbacks: RwLock<Vec<Feedback>>,
    seq: AtomicU64,
    fail_uploads: AtomicBool,
}

impl MockState {
    /// Empty store accepting the given `token -> user` pairs
    pub fn new(users: impl IntoIterator<Item = (String, MockUser)>) -> Self {
        Self {
            users: users.into_iter().collect(),
            supports: DashMap::new(),
            files: DashMap::new(),
            feedbacks: RwLock::new(Vec::new()),
            seq: AtomicU64::new(0),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// One token per role: `student-token`, `teacher-token`, `parent-token`, `admin-token`
    pub fn with_default_users() -> Self {
        Self::new(
            [Role::Student, Role::Teacher, Role::Parent, Role::Admin].map(|role| {
                (
                    format!("{}-token", role.as_str()),
                    MockUser::new(format!("{}-1", role.as_str()), role),
                )
            }),
        )
    }

    pub fn authenticate(&self, token: &str) -> Option<&MockUser> {
        self.users.get(token)
    }

    /// Make every following upload fail with a 500, without touching any Support
    pub fn set_upload_failure(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    // ========== Supports ==========

    pub fn create_support(&self, user: &MockUser, req: SupportCreateRequest) -> AppResult<Support> {
        req.validate()?;

        let id = Uuid::new_v4().to_string();
        let support = Support::from_request(id.clone(), user.id.clone(), req, Self::now());
        self.supports.insert(
            id,
            StoredSupport {
                seq: self.next_seq(),
                support: support.clone(),
            },
        );
        Ok(support)
    }

    /// Caller's Supports, newest first
    pub fn list_supports(&self, user: &MockUser, status: Option<SupportStatus>) -> Vec<Support> {
        let mut rows: Vec<(u64, Support)> = self
            .supports
            .iter()
            .filter(|entry| entry.support.user_id == user.id)
            .filter(|entry| status.is_none_or(|s| entry.support.status == s))
            .map(|entry| (entry.seq, entry.support.clone()))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.into_iter().map(|(_, support)| support).collect()
    }

    /// A Support the caller owns; others' records look absent
    pub fn get_support(&self, user: &MockUser, id: &str) -> AppResult<Support> {
        self.supports
            .get(id)
            .filter(|entry| entry.support.user_id == user.id)
            .map(|entry| entry.support.clone())
            .ok_or_else(|| AppError::not_found(format!("Support {id} not found")))
    }

    pub fn bind_chat(
        &self,
        user: &MockUser,
        id: &str,
        chat_id: &str,
    ) -> AppResult<(Support, ChatBinding)> {
        let mut entry = self
            .supports
            .get_mut(id)
            .filter(|entry| entry.support.user_id == user.id)
            .ok_or_else(|| AppError::not_found(format!("Support {id} not found")))?;

        let binding = entry.support.bind_chat(chat_id, Self::now())?;
        Ok((entry.support.clone(), binding))
    }

    pub fn advance_status(
        &self,
        user: &MockUser,
        id: &str,
        next: SupportStatus,
    ) -> AppResult<Support> {
        let mut entry = self
            .supports
            .get_mut(id)
            .filter(|entry| entry.support.user_id == user.id)
            .ok_or_else(|| AppError::not_found(format!("Support {id} not found")))?;

        entry.support.advance_status(next, Self::now())?;
        Ok(entry.support.clone())
    }

    // ========== Files ==========

    pub fn add_file(
        &self,
        user: &MockUser,
        support_id: &str,
        filename: String,
        file_type: Option<String>,
        size: u64,
    ) -> AppResult<SupportFile> {
        // ownership check only; the Support itself is left untouched
        self.get_support(user, support_id)?;

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::internal("File storage unavailable"));
        }

        let file = SupportFile {
            id: Uuid::new_v4().to_string(),
            filename,
            file_type,
            file_size: Some(size),
            support_id: Some(support_id.to_string()),
        };
        self.files.insert(file.id.clone(), file.clone());
        Ok(file)
    }

    pub fn files_for(&self, support_id: &str) -> Vec<SupportFile> {
        self.files
            .iter()
            .filter(|f| f.support_id.as_deref() == Some(support_id))
            .map(|f| f.value().clone())
            .collect()
    }

    // ========== Feedback ==========

    pub async fn add_feedback(&self, user: &MockUser, form: FeedbackForm) -> Feedback {
        let now = Utc::now().timestamp();
        let record = Feedback {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            version: 0,
            body: form.body,
            meta: form.meta,
            snapshot: form.snapshot,
            created_at: now,
            updated_at: now,
            user: Some(FeedbackUser {
                id: user.id.clone(),
                name: Some(user.name.clone()),
                email: Some(user.email.clone()),
                role: Some(user.role.as_str().to_string()),
            }),
        };
        self.feedbacks.write().await.push(record.clone());
        record
    }

    pub async fn feedbacks(&self) -> Vec<Feedback> {
        self.feedbacks.read().await.clone()
    }

    pub async fn comparisons(&self) -> Vec<Feedback> {
        self.feedbacks
            .read()
            .await
            .iter()
            .filter(|f| matches!(f.body, FeedbackBody::ResponseComparison(_)))
            .cloned()
            .collect()
    }

    pub async fn comparison(&self, id: &str) -> AppResult<Feedback> {
        self.comparisons()
            .await
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("Response feedback {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str) -> SupportCreateRequest {
        SupportCreateRequest {
            title: title.into(),
            subject: "Mathematics".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_is_newest_first_and_scoped() {
        let state = MockState::with_default_users();
        let student = state.authenticate("student-token").unwrap().clone();
        let parent = state.authenticate("parent-token").unwrap().clone();

        let first = state.create_support(&student, request("first")).unwrap();
        let second = state.create_support(&student, request("second")).unwrap();
        state.create_support(&parent, request("other")).unwrap();

        let ids: Vec<_> = state
            .list_supports(&student, None)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(state.list_supports(&student, Some(SupportStatus::Active)).is_empty());
    }

    #[test]
    fn test_foreign_support_is_not_found() {
        let state = MockState::with_default_users();
        let student = state.authenticate("student-token").unwrap().clone();
        let parent = state.authenticate("parent-token").unwrap().clone();

        let support = state.create_support(&student, request("mine")).unwrap();
        assert!(matches!(
            state.get_support(&parent, &support.id),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            state.bind_chat(&parent, &support.id, "chat-1"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_upload_leaves_support_untouched() {
        let state = MockState::with_default_users();
        let student = state.authenticate("student-token").unwrap().clone();
        let support = state.create_support(&student, request("files")).unwrap();

        state.set_upload_failure(true);
        let err = state
            .add_file(&student, &support.id, "a.pdf".into(), None, 3)
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(state.files_for(&support.id).is_empty());
        assert_eq!(state.get_support(&student, &support.id).unwrap(), support);

        state.set_upload_failure(false);
        state
            .add_file(&student, &support.id, "a.pdf".into(), None, 3)
            .unwrap();
        state
            .add_file(&student, &support.id, "b.pdf".into(), None, 3)
            .unwrap();
        assert_eq!(state.files_for(&support.id).len(), 2);
    }
}
