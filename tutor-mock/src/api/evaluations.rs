//! Evaluation endpoints
//!
//! Any authenticated user may rate a response. Comparison feedback and the
//! listings are reserved for reviewers (teacher or admin).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Feedback, FeedbackBody, FeedbackForm};

use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::state::MockState;

/// POST /evaluations/feedback
pub async fn create_feedback(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<FeedbackForm>,
) -> AppResult<Json<Feedback>> {
    if let FeedbackBody::ResponseComparison(data) = &form.body {
        data.validate()?;
    }
    let record = state.add_feedback(&user, form).await;
    tracing::info!(feedback_id = %record.id, kind = record.body.kind(), "Feedback stored");
    Ok(Json(record))
}

/// POST /evaluations/response-feedback
pub async fn create_comparison(
    State(state): State<Arc<MockState>>,
    current: CurrentUser,
    Json(form): Json<FeedbackForm>,
) -> AppResult<Json<Feedback>> {
    current.require_reviewer()?;

    match &form.body {
        FeedbackBody::ResponseComparison(data) => data.validate()?,
        FeedbackBody::Rating(_) => {
            return Err(AppError::invalid("expected response_comparison feedback"));
        }
    }
    let record = state.add_feedback(&current.0, form).await;
    tracing::info!(feedback_id = %record.id, "Comparison feedback stored");
    Ok(Json(record))
}

/// GET /evaluations/feedbacks/all
pub async fn list_all(
    State(state): State<Arc<MockState>>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Feedback>>> {
    current.require_reviewer()?;
    Ok(Json(state.feedbacks().await))
}

/// GET /evaluations/response-feedbacks/all
pub async fn list_comparisons(
    State(state): State<Arc<MockState>>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Feedback>>> {
    current.require_reviewer()?;
    Ok(Json(state.comparisons().await))
}

/// GET /evaluations/response-feedback/{id}
pub async fn get_comparison(
    State(state): State<Arc<MockState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Feedback>> {
    current.require_reviewer()?;
    state.comparison(&id).await.map(Json)
}
