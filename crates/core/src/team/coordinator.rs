//! # Team Coordinator
//!
//! Drives one task through Planning → Research → Writing → Review, then
//! synthesizes the final output and stores the session.
//!
//! A failing stage is logged and left out of the run context; the run
//! always completes with a final output. Review only runs when Writing
//! produced a result, whatever the skip flags say.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;

use crate::skills::output::StageResult;
use crate::skills::{researcher_skill, Team};
use crate::state::sessions::{
    CollaborationSummary, NewSession, SessionRecord, SessionStatus, SessionStore,
};

use super::context::RunContext;
use super::events::{TeamEvent, TeamEventKind};
use super::history::{InteractionHistory, InteractionLogEntry};
use super::pipeline::{Pipeline, Stage, StageOptions};
use super::synthesis::{synthesize, FinalOutput};

/// Configuration for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Results requested from the search provider per query
    pub search_max_results: usize,
    /// Store each finished run through the session store
    pub persist_sessions: bool,
    /// Participant list recorded with every session
    pub participants: Vec<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            search_max_results: researcher_skill::DEFAULT_MAX_RESULTS,
            persist_sessions: true,
            participants: Stage::ALL
                .iter()
                .map(|s| s.agent_name().to_string())
                .collect(),
        }
    }
}

/// Per-stage results of a run; `None` when skipped or failed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageResults {
    pub planning: Option<StageResult>,
    pub research: Option<StageResult>,
    pub writing: Option<StageResult>,
    pub review: Option<StageResult>,
}

impl StageResults {
    fn from_context(context: &RunContext) -> Self {
        Self {
            planning: context.get(Stage::Planning).cloned(),
            research: context.get(Stage::Research).cloned(),
            writing: context.get(Stage::Writing).cloned(),
            review: context.get(Stage::Review).cloned(),
        }
    }
}

/// Everything a caller gets back from one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub session_id: String,
    pub task: String,
    /// Stages that produced a result, in execution order
    pub stages_completed: Vec<Stage>,
    pub total_duration_ms: u64,
    pub results: StageResults,
    pub final_output: FinalOutput,
    pub interaction_log: Vec<InteractionLogEntry>,
    /// Identifier assigned by the session store, if the run was stored
    pub stored_session_id: Option<String>,
    /// Non-fatal problems, e.g. a failed session write
    #[serde(default)]
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Role descriptions reported by `status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentRoster {
    pub planner: String,
    pub researcher: String,
    pub writer: String,
    pub reviewer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamStatus {
    pub initialized: bool,
    pub agents: AgentRoster,
    pub active_sessions: usize,
    pub total_interactions: usize,
}

/// The pipeline orchestrator
pub struct Coordinator {
    team: Team,
    store: Arc<dyn SessionStore>,
    history: InteractionHistory,
    config: CoordinatorConfig,
    event_tx: Option<mpsc::Sender<TeamEvent>>,
}

impl Coordinator {
    pub fn new(team: Team, store: Arc<dyn SessionStore>, config: CoordinatorConfig) -> Self {
        Self {
            team: team.with_search_max_results(config.search_max_results),
            store,
            history: InteractionHistory::new(),
            config,
            event_tx: None,
        }
    }

    /// Stream team events to a channel. Full or closed channels drop events.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<TeamEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Share an existing interaction history
    pub fn with_history(mut self, history: InteractionHistory) -> Self {
        self.history = history;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn history(&self) -> &InteractionHistory {
        &self.history
    }

    fn emit(&self, event: TeamEvent) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                tracing::debug!(error = %e, "Team event dropped");
            }
        }
    }

    fn skip_reason(stage: Stage, options: &StageOptions, context: &RunContext) -> Option<&'static str> {
        if options.skips(stage) {
            return Some("skipped by request");
        }
        if stage == Stage::Review && context.get(Stage::Writing).is_none() {
            return Some("no writing output to review");
        }
        None
    }

    /// Run the team on a task. Never fails; see `RunResult::warnings`.
    #[tracing::instrument(
        skip(self, task, options),
        fields(
            session_id = tracing::field::Empty,
            task_preview = %task.chars().take(50).collect::<String>()
        )
    )]
    pub async fn run(&self, task: &str, options: StageOptions) -> RunResult {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("session_id", session_id.as_str());

        let started_at = Utc::now();
        let clock = Instant::now();
        self.emit(
            TeamEvent::new(TeamEventKind::PipelineStarted, &session_id)
                .with_data(json!({ "task": task, "options": options })),
        );
        tracing::info!("Team collaboration started");

        let mut pipeline = Pipeline::new();
        let mut context = RunContext::new();
        let mut interaction_log = Vec::new();

        for stage in Stage::ALL {
            if let Some(reason) = Self::skip_reason(stage, &options, &context) {
                pipeline.pass(stage);
                tracing::info!(stage = %stage, reason, "Stage skipped");
                self.emit(
                    TeamEvent::new(TeamEventKind::StageSkipped, &session_id)
                        .for_stage(stage)
                        .with_data(json!({ "reason": reason })),
                );
                continue;
            }

            tracing::info!(stage = %stage, agent = stage.agent_name(), "Stage started");
            self.emit(TeamEvent::new(TeamEventKind::StageStarted, &session_id).for_stage(stage));

            let outcome = self.team.adapter(stage).execute(task, &context).await;
            pipeline.pass(stage);

            match outcome {
                Ok(result) => {
                    let fallback = result.is_fallback();
                    let entry = InteractionLogEntry::new(&session_id, result.clone());
                    self.history.append(entry.clone()).await;
                    interaction_log.push(entry);
                    context.push(result);

                    tracing::info!(stage = %stage, fallback, "Stage completed");
                    self.emit(
                        TeamEvent::new(TeamEventKind::StageCompleted, &session_id)
                            .for_stage(stage)
                            .with_data(json!({ "fallback": fallback })),
                    );
                }
                Err(e) => {
                    tracing::warn!(stage = %stage, code = e.code(), error = %e, "Stage failed, continuing");
                    self.emit(
                        TeamEvent::new(TeamEventKind::StageFailed, &session_id)
                            .for_stage(stage)
                            .with_data(json!({ "code": e.code(), "error": e.to_string() })),
                    );
                }
            }
        }

        let final_output = synthesize(
            task,
            context.get(Stage::Planning),
            context.get(Stage::Research),
            context.get(Stage::Writing),
            context.get(Stage::Review),
        );
        pipeline.synthesize();

        let stages_completed = context.stages();
        let total_duration_ms = clock.elapsed().as_millis() as u64;
        let finished_at = Utc::now();

        tracing::info!(
            output = final_output.kind(),
            stages = stages_completed.len(),
            duration_ms = total_duration_ms,
            "Team collaboration complete"
        );
        self.emit(
            TeamEvent::new(TeamEventKind::PipelineCompleted, &session_id).with_data(json!({
                "type": final_output.kind(),
                "stages_completed": stages_completed,
                "total_duration_ms": total_duration_ms,
            })),
        );

        let mut warnings = Vec::new();
        let mut stored_session_id = None;

        if self.config.persist_sessions {
            let session = NewSession {
                session_id: session_id.clone(),
                title: NewSession::title_for(
                    task,
                    context.get(Stage::Writing).and_then(StageResult::title),
                ),
                description: final_output.summary().to_string(),
                original_prompt: task.to_string(),
                status: SessionStatus::Completed,
                participants: self.config.participants.clone(),
                start_time: started_at,
                end_time: Some(finished_at),
                results: context.results().to_vec(),
                final_output: final_output.clone(),
                history: interaction_log.clone(),
                summary: CollaborationSummary {
                    stages_completed: stages_completed.clone(),
                    total_duration_ms,
                    timestamp: finished_at,
                },
            };

            match self.persist(session) {
                Ok(record) => {
                    pipeline.persist();
                    tracing::info!(stored_id = %record.id, "Session stored");
                    self.emit(
                        TeamEvent::new(TeamEventKind::SessionPersisted, &session_id)
                            .with_data(json!({ "stored_session_id": record.id })),
                    );
                    stored_session_id = Some(record.id);
                }
                Err(e) => {
                    let warning = format!("Failed to persist session: {:#}", e);
                    tracing::warn!(error = %warning, "Session not stored");
                    self.emit(
                        TeamEvent::new(TeamEventKind::PersistenceFailed, &session_id)
                            .with_data(json!({ "error": warning })),
                    );
                    warnings.push(warning);
                }
            }
        }

        RunResult {
            session_id,
            task: task.to_string(),
            stages_completed,
            total_duration_ms,
            results: StageResults::from_context(&context),
            final_output,
            interaction_log,
            stored_session_id,
            warnings,
            started_at,
            finished_at,
        }
    }

    fn persist(&self, session: NewSession) -> anyhow::Result<SessionRecord> {
        self.store.save(session)
    }

    /// Team roster and history counters
    pub async fn status(&self) -> TeamStatus {
        let description = |stage: Stage| self.team.adapter(stage).description().to_string();
        TeamStatus {
            initialized: true,
            agents: AgentRoster {
                planner: description(Stage::Planning),
                researcher: description(Stage::Research),
                writer: description(Stage::Writing),
                reviewer: description(Stage::Review),
            },
            active_sessions: self.history.active_sessions().await,
            total_interactions: self.history.len().await,
        }
    }

    /// Empty the interaction history. Returns the number of removed entries.
    pub async fn clear_history(&self) -> usize {
        let removed = self.history.clear().await;
        tracing::info!(removed, "Interaction history cleared");
        removed
    }
}
