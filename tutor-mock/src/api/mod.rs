//! HTTP surface of the mock backend

mod evaluations;
mod supports;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::MockState;

/// Maximum in-flight requests
const CONCURRENCY_LIMIT: usize = 100;

/// Routes relative to the API root; the binary nests them under `/api/v1`
pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        // Supports
        .route("/supports/create", post(supports::create))
        .route("/supports/upload-file", post(supports::upload_file))
        .route("/supports/list", get(supports::list))
        .route("/supports/{id}", get(supports::get_by_id))
        .route("/supports/{id}/update-chat", patch(supports::update_chat))
        .route("/supports/{id}/status", patch(supports::update_status))
        // Evaluations
        .route("/evaluations/feedback", post(evaluations::create_feedback))
        .route("/evaluations/feedbacks/all", get(evaluations::list_all))
        .route(
            "/evaluations/response-feedback",
            post(evaluations::create_comparison),
        )
        .route(
            "/evaluations/response-feedbacks/all",
            get(evaluations::list_comparisons),
        )
        .route(
            "/evaluations/response-feedback/{id}",
            get(evaluations::get_comparison),
        )
        .layer(ConcurrencyLimitLayer::new(CONCURRENCY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn app() -> Router {
        router(Arc::new(MockState::with_default_users()))
    }

    #[tokio::test]
    async fn test_missing_token_is_401_with_detail() {
        let (status, body) = call(
            &app(),
            json_request(
                "POST",
                "/supports/create",
                None,
                json!({"title": "t", "subject": "Arts"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_link_conflict_and_status_rules() {
        let app = app();
        let (status, support) = call(
            &app,
            json_request(
                "POST",
                "/supports/create",
                Some("student-token"),
                json!({"title": "Cells", "subject": "Biology"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(support["status"], "draft");
        let id = support["id"].as_str().unwrap().to_string();

        let link = |chat: &str| {
            empty_request(
                "PATCH",
                &format!("/supports/{id}/update-chat?chat_id={chat}"),
                "student-token",
            )
        };
        assert_eq!(call(&app, link("chat-1")).await.0, StatusCode::OK);
        assert_eq!(call(&app, link("chat-1")).await.0, StatusCode::OK);
        let (status, body) = call(&app, link("chat-2")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["detail"].as_str().unwrap().contains("chat-1"));

        let set_status = |s: &str| {
            empty_request(
                "PATCH",
                &format!("/supports/{id}/status?status={s}"),
                "student-token",
            )
        };
        assert_eq!(call(&app, set_status("completed")).await.0, StatusCode::OK);
        assert_eq!(call(&app, set_status("active")).await.0, StatusCode::CONFLICT);
        assert_eq!(
            call(&app, set_status("paused")).await.0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_evaluation_listing_requires_reviewer() {
        let app = app();
        let list = |token: &str| empty_request("GET", "/evaluations/feedbacks/all", token);

        let (status, _) = call(&app, list("student-token")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, list("teacher-token")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_comparison_is_404() {
        let (status, _) = call(
            &app(),
            empty_request("GET", "/evaluations/response-feedback/nope", "admin-token"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
