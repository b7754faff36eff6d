//! # Session Store
//!
//! Durable records of completed team runs, stored in the `sessions` table.
//! Records are written once by the coordinator; only `status` may be
//! patched afterwards.

use super::db::CollabDb;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::skills::output::StageResult;
use crate::team::history::InteractionLogEntry;
use crate::team::pipeline::Stage;
use crate::team::synthesis::FinalOutput;

const TITLE_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Completed,
    Failed,
    InProgress,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::InProgress => "in-progress",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "in-progress" => Some(Self::InProgress),
            _ => None,
        }
    }
}

/// Timing and stage summary of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollaborationSummary {
    pub stages_completed: Vec<Stage>,
    pub total_duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// A session as handed to the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSession {
    /// Run identifier the coordinator generated
    pub session_id: String,
    pub title: String,
    pub description: String,
    pub original_prompt: String,
    pub status: SessionStatus,
    pub participants: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub results: Vec<StageResult>,
    pub final_output: FinalOutput,
    pub history: Vec<InteractionLogEntry>,
    pub summary: CollaborationSummary,
}

impl NewSession {
    /// Writing title when there is one, otherwise the task cut to 60 characters.
    pub fn title_for(task: &str, writing_title: Option<&str>) -> String {
        if let Some(title) = writing_title.filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        if task.chars().count() > TITLE_MAX_CHARS {
            let cut: String = task.chars().take(TITLE_MAX_CHARS).collect();
            format!("{}...", cut)
        } else {
            task.to_string()
        }
    }
}

/// A stored session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// Store-assigned identifier
    pub id: String,
    #[serde(flatten)]
    pub session: NewSession,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub in_progress: usize,
}

/// Append-and-lookup store for completed runs
pub trait SessionStore: Send + Sync {
    /// Store a session under a new identifier
    fn save(&self, session: NewSession) -> Result<SessionRecord>;

    fn get(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// All sessions, most recent first
    fn list_all(&self) -> Result<Vec<SessionRecord>>;

    /// Patch the status of a stored session
    fn update_status(&self, id: &str, status: SessionStatus) -> Result<Option<SessionRecord>>;

    /// Returns false when no such session exists
    fn delete(&self, id: &str) -> Result<bool>;

    fn stats(&self) -> Result<SessionStats>;
}

/// SQLite-backed session manager
pub struct SessionManager {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, title, description, original_prompt, status,
           participants_json, start_time, end_time, results_json,
           final_output_json, history_json, summary_json, created_at, updated_at
    FROM sessions
"#;

impl SessionManager {
    /// Create from shared CollabDb connection
    pub fn new(db: &CollabDb) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<SessionRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))?;
        let record = stmt
            .query_row(params![id], Self::row_to_record)
            .optional()
            .context("Failed to load session")?;
        Ok(record)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SessionRecord> {
        let status: String = row.get(5)?;
        let participants_json: String = row.get(6)?;
        let start_time: String = row.get(7)?;
        let end_time: Option<String> = row.get(8)?;
        let results_json: String = row.get(9)?;
        let final_output_json: String = row.get(10)?;
        let history_json: String = row.get(11)?;
        let summary_json: String = row.get(12)?;
        let created_at: String = row.get(13)?;
        let updated_at: String = row.get(14)?;

        let json_err = |idx: usize, e: serde_json::Error| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        };

        Ok(SessionRecord {
            id: row.get(0)?,
            session: NewSession {
                session_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                original_prompt: row.get(4)?,
                status: SessionStatus::parse(&status).unwrap_or(SessionStatus::Completed),
                participants: serde_json::from_str(&participants_json).unwrap_or_default(),
                start_time: parse_time(&start_time),
                end_time: end_time.as_deref().map(parse_time),
                results: serde_json::from_str(&results_json).map_err(|e| json_err(9, e))?,
                final_output: serde_json::from_str(&final_output_json)
                    .map_err(|e| json_err(10, e))?,
                history: serde_json::from_str(&history_json).map_err(|e| json_err(11, e))?,
                summary: serde_json::from_str(&summary_json).map_err(|e| json_err(12, e))?,
            },
            created_at: parse_time(&created_at),
            updated_at: parse_time(&updated_at),
        })
    }
}

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SessionStore for SessionManager {
    fn save(&self, session: NewSession) -> Result<SessionRecord> {
        let now = Utc::now();
        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            session,
            created_at: now,
            updated_at: now,
        };
        let s = &record.session;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO sessions
            (id, session_id, title, description, original_prompt, status,
             participants_json, start_time, end_time, results_json,
             final_output_json, history_json, summary_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                record.id,
                s.session_id,
                s.title,
                s.description,
                s.original_prompt,
                s.status.as_str(),
                serde_json::to_string(&s.participants)?,
                s.start_time.to_rfc3339(),
                s.end_time.map(|t| t.to_rfc3339()),
                serde_json::to_string(&s.results)?,
                serde_json::to_string(&s.final_output)?,
                serde_json::to_string(&s.history)?,
                serde_json::to_string(&s.summary)?,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .context("Failed to save session")?;

        Ok(record)
    }

    fn get(&self, id: &str) -> Result<Option<SessionRecord>> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn list_all(&self) -> Result<Vec<SessionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list sessions")?;

        Ok(records)
    }

    fn update_status(&self, id: &str, status: SessionStatus) -> Result<Option<SessionRecord>> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id],
        )?;

        if affected == 0 {
            return Ok(None);
        }
        Self::fetch(&conn, id)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let affected = conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])
            .context("Failed to delete session")?;
        Ok(affected > 0)
    }

    fn stats(&self) -> Result<SessionStats> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM sessions GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut stats = SessionStats::default();
        for row in rows {
            let (status, count) = row?;
            let count = count as usize;
            stats.total += count;
            match SessionStatus::parse(&status) {
                Some(SessionStatus::Completed) => stats.completed += count,
                Some(SessionStatus::Failed) => stats.failed += count,
                Some(SessionStatus::InProgress) => stats.in_progress += count,
                None => {}
            }
        }
        Ok(stats)
    }
}
