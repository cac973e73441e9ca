//! Support endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    ChatBinding, ChatLinkResponse, StatusUpdateResponse, Support, SupportCreateRequest,
    SupportFile, SupportStatus,
};
use shared::validation::normalize_id;

use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::state::MockState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    status: Option<String>,
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<SupportStatus>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(s.parse()?)),
        None => Ok(None),
    }
}

/// POST /supports/create
pub async fn create(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SupportCreateRequest>,
) -> AppResult<Json<Support>> {
    let support = state.create_support(&user, payload)?;
    tracing::info!(
        support_id = %support.id,
        user_id = %user.id,
        subject = support.display_subject(),
        status = %support.status,
        "Support created"
    );
    Ok(Json(support))
}

/// GET /supports/list
pub async fn list(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Support>>> {
    let status = parse_status(query.status.as_deref())?;
    Ok(Json(state.list_supports(&user, status)))
}

/// GET /supports/{id}
pub async fn get_by_id(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Support>> {
    state.get_support(&user, &id).map(Json)
}

/// PATCH /supports/{id}/update-chat?chat_id=
pub async fn update_chat(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ChatQuery>,
) -> AppResult<Json<ChatLinkResponse>> {
    let chat_id = normalize_id(query.chat_id.as_deref().unwrap_or_default(), "chat_id")?;

    let (support, binding) = state.bind_chat(&user, &id, chat_id).map_err(|e| {
        if let AppError::Conflict(msg) = &e {
            tracing::warn!(support_id = %id, chat_id, %msg, "Chat rebind refused");
        }
        e
    })?;

    let message = match binding {
        ChatBinding::Bound => {
            tracing::info!(support_id = %support.id, chat_id, status = %support.status, "Chat linked");
            "Chat linked to support"
        }
        ChatBinding::AlreadyBound => "Chat already linked to support",
    };

    Ok(Json(ChatLinkResponse {
        id: support.id,
        chat_id: chat_id.to_string(),
        status: "success".to_string(),
        message: Some(message.to_string()),
    }))
}

/// PATCH /supports/{id}/status?status=
pub async fn update_status(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let next = parse_status(query.status.as_deref())?
        .ok_or_else(|| AppError::invalid("status is required"))?;

    let support = state.advance_status(&user, &id, next)?;
    tracing::info!(support_id = %support.id, status = %support.status, "Support status updated");
    Ok(Json(StatusUpdateResponse {
        id: support.id,
        status: support.status,
        updated_at: support.updated_at,
    }))
}

/// POST /supports/upload-file (multipart: `support_id`, `file`)
pub async fn upload_file(
    State(state): State<Arc<MockState>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<SupportFile>> {
    let mut support_id: Option<String> = None;
    let mut file: Option<(String, Option<String>, usize)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("support_id") => support_id = Some(field.text().await?),
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some((filename, content_type, bytes.len()));
            }
            _ => {}
        }
    }

    let support_id = support_id.ok_or_else(|| AppError::invalid("support_id field is required"))?;
    let support_id = normalize_id(&support_id, "support_id")?;
    let (filename, content_type, size) =
        file.ok_or_else(|| AppError::invalid("file field is required"))?;

    let stored = state.add_file(&user, support_id, filename, content_type, size as u64)?;
    tracing::info!(support_id, file_id = %stored.id, size, "Attachment stored");
    Ok(Json(stored))
}
