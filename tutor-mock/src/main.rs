use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::info;
use tutor_mock::{MockState, config::Config, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutor_mock=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let state = match config.tokens {
        Some(tokens) => MockState::new(tokens),
        None => {
            info!("MOCK_TOKENS not set, using student-token / teacher-token / parent-token / admin-token");
            MockState::with_default_users()
        }
    };

    let app = Router::new().nest("/api/v1", router(Arc::new(state)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("tutor-mock listening on http://{}/api/v1", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
