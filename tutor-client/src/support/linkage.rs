//! Support Linkage Service
//!
//! Binds a newly started chat session to the Support it came from, exactly
//! once. Retrying the same `(support_id, chat_id)` pair is safe; a different
//! chat id for an already linked Support is a conflict and is never
//! overwritten. No retries happen here: the caller owns attempt tracking.

use shared::models::ChatLinkResponse;
use shared::validation::normalize_id;

use super::repository::SupportRepository;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct LinkageService<R> {
    repository: R,
}

impl<R: SupportRepository> LinkageService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Link `support_id` to `chat_id`
    ///
    /// Blank ids fail locally with a validation error before any request.
    /// Validation, auth, not-found and conflict errors are returned as-is;
    /// transport and server failures are wrapped in [`ClientError::Linkage`]
    /// with both ids and the status code, if any.
    pub async fn link(&self, support_id: &str, chat_id: &str) -> ClientResult<ChatLinkResponse> {
        let support_id = normalize_id(support_id, "support_id")?;
        let chat_id = normalize_id(chat_id, "chat_id")?;

        match self.repository.update_chat_id(support_id, chat_id).await {
            Ok(response) => {
                tracing::info!(support_id, chat_id, "Support linked to chat");
                Ok(response)
            }
            Err(e) => Err(self.contextualize(support_id, chat_id, e)),
        }
    }

    fn contextualize(&self, support_id: &str, chat_id: &str, error: ClientError) -> ClientError {
        match error {
            e @ (ClientError::Validation(_)
            | ClientError::Auth { .. }
            | ClientError::NotFound(_)
            | ClientError::Conflict(_)) => {
                tracing::warn!(support_id, chat_id, error = %e, "Support linkage rejected");
                e
            }
            other => {
                let status = other.status();
                tracing::warn!(
                    support_id,
                    chat_id,
                    status = status.map(|s| s.as_u16()),
                    error = %other,
                    "Support linkage failed"
                );
                ClientError::Linkage {
                    support_id: support_id.to_string(),
                    chat_id: chat_id.to_string(),
                    status,
                    source: Box::new(other),
                }
            }
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}
