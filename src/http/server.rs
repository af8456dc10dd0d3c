//! HTTP server setup and management

use std::sync::Arc;
use axum::{
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use crate::loader::SnapshotCache;
use super::handlers::{agent, health, resource, snapshot, status, AppState};

/// Routes over `cache`, without binding a socket
pub fn router(cache: Arc<SnapshotCache>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/snapshot", get(snapshot))
        .route("/resources/:name", get(resource))
        .route("/agents/:id", get(agent))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(cache))
}

/// Start the HTTP server
pub async fn start(bind: &str, port: u16, cache: Arc<SnapshotCache>) -> crate::Result<()> {
    let app = router(cache);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, port)).await?;
    tracing::info!("Dashboard API listening on http://{}/snapshot", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
