//! # Session API
//!
//! Browse, patch and delete stored team sessions.

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use collab_core::state::{SessionRecord, SessionStats, SessionStatus};
use serde::Deserialize;

use super::{ApiError, ApiResponse};
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    /// `completed`, `failed` or `in-progress`
    pub status: SessionStatus,
}

pub fn session_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/history", get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/status", patch(update_status))
        .route("/api/stats", get(stats))
}

/// All stored sessions, most recent first
async fn list_sessions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    let sessions = state.store.list_all().map_err(ApiError::internal)?;
    Ok(Json(sessions))
}

async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionRecord>, ApiError> {
    state
        .store
        .get(&id)
        .map_err(ApiError::internal)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Session {} not found", id)))
}

async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<StatusPatch>,
) -> Result<Json<SessionRecord>, ApiError> {
    let record = state
        .store
        .update_status(&id, req.status)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(format!("Session {} not found", id)))?;

    tracing::info!(session = %id, status = req.status.as_str(), "Session status updated");
    Ok(Json(record))
}

async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    if !state.store.delete(&id).map_err(ApiError::internal)? {
        return Err(ApiError::not_found(format!("Session {} not found", id)));
    }

    tracing::info!(session = %id, "Session deleted");
    Ok(Json(ApiResponse {
        success: true,
        message: format!("Session {} deleted", id),
    }))
}

async fn stats(State(state): State<SharedState>) -> Result<Json<SessionStats>, ApiError> {
    let stats = state.store.stats().map_err(ApiError::internal)?;
    Ok(Json(stats))
}
