//! # Collab Skills
//!
//! The four role adapters of the team and the contract they share.
//!
//! ## Architecture
//!
//! ```text
//! Team (exactly one adapter per stage)
//!   ├── PlannerSkill     PLANNING TASK
//!   ├── ResearcherSkill  RESEARCH TASK + web search
//!   ├── WriterSkill      WRITING TASK + research data
//!   └── ReviewerSkill    REVIEW TASK + content to review
//! ```
//!
//! Every adapter builds an enhanced prompt, calls the shared generation
//! backend once, and parses the reply with `output::parse_structured`.
//! Backend failures propagate; parse failures become fallback records.

pub mod output;
pub mod prompts;

pub mod planner_skill;
pub mod researcher_skill;
pub mod reviewer_skill;
pub mod writer_skill;

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::team::context::RunContext;
use crate::team::pipeline::Stage;
use crate::tools::search::SearchProvider;

pub use output::{
    parse_structured, FallbackOutput, PlanOutput, ResearchOutput, ReviewOutput, SearchTrace,
    StageOutput, StageResult, WritingOutput,
};
pub use planner_skill::PlannerSkill;
pub use researcher_skill::ResearcherSkill;
pub use reviewer_skill::ReviewerSkill;
pub use writer_skill::WriterSkill;

/// One stage's worth of work.
#[async_trait]
pub trait RoleAdapter: Send + Sync {
    /// The stage this adapter owns
    fn stage(&self) -> Stage;

    /// One-line description for status reports
    fn description(&self) -> &'static str;

    /// Readiness check, run once before the first pipeline run
    async fn initialize(&self) -> Result<(), BackendError>;

    /// Execute the stage. Only backend failures are returned as errors.
    async fn execute(&self, task: &str, context: &RunContext) -> Result<StageResult, BackendError>;
}

/// The fixed set of role adapters.
pub struct Team {
    planner: PlannerSkill,
    researcher: ResearcherSkill,
    writer: WriterSkill,
    reviewer: ReviewerSkill,
}

impl Team {
    pub fn new(backend: Arc<dyn GenerationBackend>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            planner: PlannerSkill::new(backend.clone()),
            researcher: ResearcherSkill::new(backend.clone(), search),
            writer: WriterSkill::new(backend.clone()),
            reviewer: ReviewerSkill::new(backend),
        }
    }

    /// Build the team and initialize all four adapters concurrently.
    ///
    /// Fails with the first initialization error.
    pub async fn assemble(
        backend: Arc<dyn GenerationBackend>,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self, BackendError> {
        let provider = backend.name();
        let model = backend.model().to_string();
        let team = Self::new(backend, search);

        tokio::try_join!(
            team.planner.initialize(),
            team.researcher.initialize(),
            team.writer.initialize(),
            team.reviewer.initialize(),
        )?;

        tracing::info!(provider, model = %model, "Team assembled");
        Ok(team)
    }

    /// Results requested from the search provider per query
    pub fn with_search_max_results(mut self, max_results: usize) -> Self {
        self.researcher = self.researcher.with_max_results(max_results);
        self
    }

    pub fn adapter(&self, stage: Stage) -> &dyn RoleAdapter {
        match stage {
            Stage::Planning => &self.planner,
            Stage::Research => &self.researcher,
            Stage::Writing => &self.writer,
            Stage::Review => &self.reviewer,
        }
    }

    /// All adapters in stage order
    pub fn adapters(&self) -> [&dyn RoleAdapter; 4] {
        Stage::ALL.map(|stage| self.adapter(stage))
    }
}

/// `LABEL: {json}` holding the context results of `stages`, keyed by stage name.
///
/// `None` when none of the stages produced a result.
pub(crate) fn context_block(label: &str, context: &RunContext, stages: &[Stage]) -> Option<String> {
    let mut slice = serde_json::Map::new();
    for stage in stages {
        if let Some(result) = context.get(*stage) {
            let value = serde_json::to_value(result).unwrap_or(serde_json::Value::Null);
            slice.insert(stage.as_str().to_string(), value);
        }
    }

    if slice.is_empty() {
        return None;
    }

    let json = serde_json::to_string_pretty(&serde_json::Value::Object(slice)).unwrap_or_default();
    Some(format!("{}: {}", label, json))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::backend::GenerationBackend;
    use crate::error::BackendError;
    use crate::models::BackendKind;
    use crate::team::pipeline::Stage;

    /// Answers every prompt with the same reply and records prompts.
    pub struct StaticBackend {
        reply: Result<String, BackendError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StaticBackend {
        pub fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(err: BackendError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl GenerationBackend for StaticBackend {
        fn name(&self) -> &'static str {
            "static"
        }

        fn model(&self) -> &str {
            "static-model"
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Local
        }

        async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    /// Answers by stage, recognised from the task marker in the prompt.
    #[derive(Default)]
    pub struct ScriptedBackend {
        replies: HashMap<Stage, Result<String, BackendError>>,
        calls: Mutex<Vec<Stage>>,
    }

    impl ScriptedBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(mut self, stage: Stage, text: &str) -> Self {
            self.replies.insert(stage, Ok(text.to_string()));
            self
        }

        pub fn fail(mut self, stage: Stage) -> Self {
            self.replies.insert(
                stage,
                Err(BackendError::unavailable(format!("{} backend down", stage))),
            );
            self
        }

        pub fn calls(&self) -> Vec<Stage> {
            self.calls.lock().unwrap().clone()
        }

        fn stage_of(prompt: &str) -> Option<Stage> {
            let marker = |m: &str| prompt.lines().any(|l| l.starts_with(m));
            if marker("PLANNING TASK:") {
                Some(Stage::Planning)
            } else if marker("RESEARCH TASK:") {
                Some(Stage::Research)
            } else if marker("WRITING TASK:") {
                Some(Stage::Writing)
            } else if marker("REVIEW TASK:") {
                Some(Stage::Review)
            } else {
                None
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
            let stage = Self::stage_of(prompt)
                .ok_or_else(|| BackendError::unavailable("unrecognised prompt"))?;
            self.calls.lock().unwrap().push(stage);
            self.replies
                .get(&stage)
                .cloned()
                .unwrap_or_else(|| Ok(format!("{} output", stage)))
        }
    }
}
