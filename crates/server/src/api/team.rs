//! # Team API
//!
//! Single-shot generation and the four-agent team pipeline.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use collab_core::team::{Coordinator, RunResult, StageOptions, TeamStatus};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use super::{require_prompt, ApiError};
use crate::SharedState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
    pub provider: &'static str,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct CollaborateRequest {
    pub prompt: String,
    #[serde(default)]
    pub options: StageOptions,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
}

pub fn team_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/team/collaborate", post(collaborate))
        .route("/api/team/status", get(status))
        .route("/api/team/clear-history", post(clear_history))
        .route("/api/team/events", get(events))
}

fn coordinator(state: &SharedState) -> Result<Arc<Coordinator>, ApiError> {
    state.coordinator.clone().ok_or_else(ApiError::team_unavailable)
}

/// Send a prompt straight to the generation backend
async fn ask(
    State(state): State<SharedState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let prompt = require_prompt(&req.prompt)?;
    let backend = state.backend.clone()?;

    let reply = backend.generate(prompt).await.map_err(|e| {
        tracing::warn!(code = e.code(), error = %e, "Ask failed");
        ApiError::from(e)
    })?;

    Ok(Json(AskResponse {
        reply,
        provider: backend.name(),
        model: backend.model().to_string(),
    }))
}

/// Run the team pipeline on a prompt and wait for the result
async fn collaborate(
    State(state): State<SharedState>,
    Json(req): Json<CollaborateRequest>,
) -> Result<Json<RunResult>, ApiError> {
    let coordinator = coordinator(&state)?;
    let prompt = require_prompt(&req.prompt)?;
    let result = coordinator.run(prompt, req.options).await;
    Ok(Json(result))
}

async fn status(State(state): State<SharedState>) -> Result<Json<TeamStatus>, ApiError> {
    let coordinator = coordinator(&state)?;
    Ok(Json(coordinator.status().await))
}

async fn clear_history(
    State(state): State<SharedState>,
) -> Result<Json<ClearHistoryResponse>, ApiError> {
    let coordinator = coordinator(&state)?;
    let removed = coordinator.clear_history().await;
    Ok(Json(ClearHistoryResponse {
        success: true,
        message: "Team interaction history cleared".to_string(),
        removed,
    }))
}

/// SSE stream of team events with a heartbeat comment every 15 seconds
async fn events(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    coordinator(&state)?;
    let rx = state.event_tx.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match tokio::time::timeout(HEARTBEAT_INTERVAL, rx.recv()).await {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Ok(Err(RecvError::Lagged(skipped))) => Some((
                Ok(Event::default().comment(format!("lagged {}", skipped))),
                rx,
            )),
            Ok(Err(RecvError::Closed)) => None,
            Err(_) => Some((Ok(Event::default().comment("heartbeat")), rx)),
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
