//! Bearer token extractor

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use shared::models::Role;

use crate::error::AppError;
use crate::state::{MockState, MockUser};

/// Authenticated caller
///
/// Missing or unknown tokens are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub MockUser);

impl CurrentUser {
    /// 403 unless the caller may read or write evaluation data
    pub fn require_reviewer(&self) -> Result<(), AppError> {
        if self.0.role.can_review_feedback() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.0.id, role = self.0.role.as_str(), "Reviewer role required");
            Err(AppError::forbidden(format!(
                "Role '{}' may not access evaluations; {} or {} required",
                self.0.role.as_str(),
                Role::Teacher.as_str(),
                Role::Admin.as_str()
            )))
        }
    }
}

fn bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<Arc<MockState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<MockState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer)
            .ok_or(AppError::Unauthorized)?;

        match state.authenticate(token) {
            Some(user) => Ok(Self(user.clone())),
            None => {
                tracing::warn!(uri = %parts.uri, "Unknown bearer token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
