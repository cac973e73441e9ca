//! Test harness: a mock backend on an ephemeral port

#![allow(dead_code)]

use std::sync::Arc;

use tutor_client::{ClientConfig, TutorClient};
use tutor_mock::MockState;

pub const STUDENT: &str = "student-token";
pub const TEACHER: &str = "teacher-token";

pub struct TestServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl TestServer {
    pub async fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("tutor_client=debug,tutor_mock=debug")
            .with_test_writer()
            .try_init();

        let state = Arc::new(MockState::with_default_users());
        let app = tutor_mock::router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self, token: &str) -> TutorClient {
        ClientConfig::new(&self.base_url)
            .with_token(token)
            .with_timeout(5)
            .build()
            .unwrap()
    }

    pub fn anonymous(&self) -> TutorClient {
        ClientConfig::new(&self.base_url).build().unwrap()
    }
}
