//! # Team Events
//!
//! Progress events emitted by the coordinator while a run executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pipeline::Stage;

/// Kind of team event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeamEventKind {
    /// Run accepted, session id assigned
    PipelineStarted,
    /// Stage handed to its adapter
    StageStarted,
    /// Stage produced a result
    StageCompleted,
    /// Stage adapter failed; the run continues
    StageFailed,
    /// Stage not run (skip flag, or Review without Writing)
    StageSkipped,
    /// Final output synthesized
    PipelineCompleted,
    /// Session record stored
    SessionPersisted,
    /// Session record could not be stored
    PersistenceFailed,
}

/// An event in a team run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEvent {
    /// Unique event ID
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: TeamEventKind,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl TeamEvent {
    pub fn new(kind: TeamEventKind, session_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            session_id: session_id.to_string(),
            stage: None,
            data: None,
        }
    }

    /// Attach the stage this event is about
    pub fn for_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Agent that owns the event's stage, if any
    pub fn agent(&self) -> Option<&'static str> {
        self.stage.map(|s| s.agent_name())
    }
}
