//! Shared helpers for the integration suite.

use std::sync::Arc;

use metacat::api::{self, AppState};
use metacat::warehouse::SqlExecutor;

/// Binds the API router to an ephemeral local port and returns its base URL.
pub async fn spawn_app(executor: Arc<dyn SqlExecutor>) -> String {
    let app = api::router(AppState::new(executor));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
