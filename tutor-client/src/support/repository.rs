//! Support Repository
//!
//! Client-facing contract of the Support store. The backend owns the data;
//! this trait is the seam the wizard and the linkage service depend on, and
//! [`SupportApi`] is its HTTP implementation.

use async_trait::async_trait;
use std::sync::Arc;
use shared::models::{
    ChatLinkResponse, StatusUpdateResponse, Support, SupportCreateRequest, SupportStatus,
};
use shared::validation::{MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, normalize_id, validate_required_text};

use crate::{ClientResult, HttpClient};

/// Support store operations
#[async_trait]
pub trait SupportRepository: Send + Sync {
    /// Create a Support; the backend assigns `id`, `status` and timestamps
    async fn create(&self, payload: &SupportCreateRequest) -> ClientResult<Support>;

    /// Supports owned by the caller, optionally filtered by status
    async fn list(&self, status: Option<SupportStatus>) -> ClientResult<Vec<Support>>;

    /// One Support, or `NotFound`
    async fn get_by_id(&self, id: &str) -> ClientResult<Support>;

    /// Bind a chat session to a Support (at most once)
    async fn update_chat_id(&self, id: &str, chat_id: &str) -> ClientResult<ChatLinkResponse>;

    /// Move a Support forward in its lifecycle
    async fn update_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> ClientResult<StatusUpdateResponse>;
}

#[async_trait]
impl<T: SupportRepository + ?Sized> SupportRepository for Arc<T> {
    async fn create(&self, payload: &SupportCreateRequest) -> ClientResult<Support> {
        (**self).create(payload).await
    }

    async fn list(&self, status: Option<SupportStatus>) -> ClientResult<Vec<Support>> {
        (**self).list(status).await
    }

    async fn get_by_id(&self, id: &str) -> ClientResult<Support> {
        (**self).get_by_id(id).await
    }

    async fn update_chat_id(&self, id: &str, chat_id: &str) -> ClientResult<ChatLinkResponse> {
        (**self).update_chat_id(id, chat_id).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> ClientResult<StatusUpdateResponse> {
        (**self).update_status(id, status).await
    }
}

/// HTTP implementation of [`SupportRepository`]
#[derive(Debug, Clone)]
pub struct SupportApi {
    http: HttpClient,
}

impl SupportApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn support_path(id: &str, suffix: &str) -> String {
        format!("/supports/{}{}", urlencoding::encode(id), suffix)
    }
}

#[async_trait]
impl SupportRepository for SupportApi {
    async fn create(&self, payload: &SupportCreateRequest) -> ClientResult<Support> {
        validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
        validate_required_text(&payload.subject, "subject", MAX_SHORT_TEXT_LEN)?;

        let support: Support = self.http.post("/supports/create", payload).await?;
        tracing::info!(support_id = %support.id, status = %support.status, "Support created");
        Ok(support)
    }

    async fn list(&self, status: Option<SupportStatus>) -> ClientResult<Vec<Support>> {
        match status {
            Some(status) => {
                self.http
                    .get_with_query("/supports/list", &[("status", status.as_str())])
                    .await
            }
            None => self.http.get("/supports/list").await,
        }
    }

    async fn get_by_id(&self, id: &str) -> ClientResult<Support> {
        let id = normalize_id(id, "support_id")?;
        self.http.get(&Self::support_path(id, "")).await
    }

    async fn update_chat_id(&self, id: &str, chat_id: &str) -> ClientResult<ChatLinkResponse> {
        let id = normalize_id(id, "support_id")?;
        let chat_id = normalize_id(chat_id, "chat_id")?;

        tracing::debug!(support_id = id, chat_id, "Updating support chat id");
        self.http
            .patch_query(
                &Self::support_path(id, "/update-chat"),
                &[("chat_id", chat_id)],
            )
            .await
    }

    async fn update_status(
        &self,
        id: &str,
        status: SupportStatus,
    ) -> ClientResult<StatusUpdateResponse> {
        let id = normalize_id(id, "support_id")?;
        self.http
            .patch_query(
                &Self::support_path(id, "/status"),
                &[("status", status.as_str())],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;

    fn api() -> SupportApi {
        // Port 9 (discard) is never contacted: every case below fails before dispatch.
        SupportApi::new(HttpClient::new("http://127.0.0.1:9", None, 1).unwrap())
    }

    #[test]
    fn test_support_path_is_encoded() {
        assert_eq!(SupportApi::support_path("abc", ""), "/supports/abc");
        assert_eq!(
            SupportApi::support_path("a/b c", "/update-chat"),
            "/supports/a%2Fb%20c/update-chat"
        );
    }

    #[tokio::test]
    async fn test_update_chat_id_rejects_blank_ids_locally() {
        let err = api().update_chat_id("   ", "chat-1").await.unwrap_err();
        match err {
            ClientError::Validation(v) => assert_eq!(v.field_name(), Some("support_id")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = api().update_chat_id("s1", "\t").await.unwrap_err();
        match err {
            ClientError::Validation(v) => assert_eq!(v.field_name(), Some("chat_id")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_requires_title_and_subject() {
        let payload = SupportCreateRequest {
            title: String::new(),
            subject: "Mathematics".into(),
            ..Default::default()
        };
        assert!(api().create(&payload).await.unwrap_err().is_validation());

        let payload = SupportCreateRequest {
            title: "Fractions".into(),
            subject: " ".into(),
            ..Default::default()
        };
        assert!(api().create(&payload).await.unwrap_err().is_validation());
    }
}
