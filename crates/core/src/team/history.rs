//! Process-wide interaction history shared by all runs.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::pipeline::Stage;
use crate::skills::output::StageResult;

/// One executed stage of one session. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionLogEntry {
    pub session_id: String,
    pub stage: Stage,
    /// Agent name, e.g. "WriterAgent"
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub result: StageResult,
}

impl InteractionLogEntry {
    pub fn new(session_id: &str, result: StageResult) -> Self {
        Self {
            session_id: session_id.to_string(),
            stage: result.role,
            agent: result.role.agent_name().to_string(),
            timestamp: Utc::now(),
            result,
        }
    }
}

/// Append-only log, safe for concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct InteractionHistory {
    entries: Arc<RwLock<Vec<InteractionLogEntry>>>,
}

impl InteractionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, entry: InteractionLogEntry) {
        self.entries.write().await.push(entry);
    }

    /// Entries of one session in execution order
    pub async fn for_session(&self, session_id: &str) -> Vec<InteractionLogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of distinct sessions with at least one entry
    pub async fn active_sessions(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|e| e.session_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Drop every entry. Returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_per_session() {
        let history = InteractionHistory::new();
        history
            .append(InteractionLogEntry::new(
                "a",
                StageResult::from_generated(Stage::Planning, "plan"),
            ))
            .await;
        history
            .append(InteractionLogEntry::new(
                "b",
                StageResult::from_generated(Stage::Writing, "text"),
            ))
            .await;
        history
            .append(InteractionLogEntry::new(
                "a",
                StageResult::from_generated(Stage::Research, "notes"),
            ))
            .await;

        let a = history.for_session("a").await;
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].stage, Stage::Planning);
        assert_eq!(a[1].agent, "ResearchAgent");

        assert_eq!(history.len().await, 3);
        assert_eq!(history.active_sessions().await, 2);

        assert_eq!(history.clear().await, 3);
        assert!(history.is_empty().await);
        assert_eq!(history.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let history = InteractionHistory::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let history = history.clone();
            handles.push(tokio::spawn(async move {
                let session = format!("s{}", i % 4);
                history
                    .append(InteractionLogEntry::new(
                        &session,
                        StageResult::from_generated(Stage::Writing, "x"),
                    ))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(history.len().await, 16);
        assert_eq!(history.active_sessions().await, 4);
    }
}
