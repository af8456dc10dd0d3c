//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use crate::loader::{Snapshot, SnapshotCache};
use crate::utils::format;
use super::models::StatusResponse;

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }
}

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "botdash"
    }))
}

/// Latest complete snapshot, 503 until the first cycle finishes
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, StatusCode> {
    match state.cache.snapshot() {
        Some(snapshot) => Ok(Json(snapshot.as_ref().clone())),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

pub async fn resource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state.cache.get(&name).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state.cache.get_agent(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Status endpoint handler
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let response = match state.cache.current() {
        Some(cached) => {
            let snapshot = cached.snapshot;
            StatusResponse {
                loaded: true,
                last_update: Some(format::timestamp(cached.updated_at)),
                resources_ok: snapshot.loaded_count(),
                resources_total: snapshot.total_count(),
                resources_failed: snapshot.failures().keys().cloned().collect(),
                failures: snapshot.failures().clone(),
            }
        }
        None => StatusResponse {
            loaded: false,
            last_update: None,
            resources_ok: 0,
            resources_total: 0,
            resources_failed: Vec::new(),
            failures: Default::default(),
        },
    };
    Json(response)
}
