#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use collab_core::backend::GenerationBackend;
use collab_core::models::BackendKind;
use collab_core::skills::Team;
use collab_core::state::{CollabDb, SessionManager, SessionStore};
use collab_core::team::{Coordinator, CoordinatorConfig, Stage};
use collab_core::tools::SimulatedSearch;
use collab_core::BackendError;

/// Replies per stage, recognising the stage from the task marker line.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: HashMap<Stage, Result<String, BackendError>>,
    prompts: Mutex<Vec<(Stage, String)>>,
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
            Err(BackendError::unavailable(format!("{} unreachable", stage))),
        );
        self
    }

    pub fn calls(&self) -> Vec<Stage> {
        self.prompts.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }

    pub fn prompt_for(&self, stage: Stage) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, p)| p.clone())
    }
}

fn stage_of(prompt: &str) -> Option<Stage> {
    let markers = [
        ("PLANNING TASK:", Stage::Planning),
        ("RESEARCH TASK:", Stage::Research),
        ("WRITING TASK:", Stage::Writing),
        ("REVIEW TASK:", Stage::Review),
    ];
    markers
        .iter()
        .find(|(marker, _)| prompt.lines().any(|l| l.starts_with(marker)))
        .map(|(_, stage)| *stage)
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
        BackendKind::Local
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let stage = stage_of(prompt).ok_or_else(|| BackendError::unavailable("no task marker"))?;
        self.prompts
            .lock()
            .unwrap()
            .push((stage, prompt.to_string()));
        self.replies
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| Ok(format!("{} notes", stage)))
    }
}

pub fn memory_store() -> Arc<dyn SessionStore> {
    let db = CollabDb::open_in_memory().unwrap();
    Arc::new(SessionManager::new(&db))
}

pub fn coordinator(backend: Arc<ScriptedBackend>) -> Coordinator {
    coordinator_with_store(backend, memory_store())
}

pub fn coordinator_with_store(
    backend: Arc<ScriptedBackend>,
    store: Arc<dyn SessionStore>,
) -> Coordinator {
    let team = Team::new(backend, Arc::new(SimulatedSearch));
    Coordinator::new(team, store, CoordinatorConfig::default())
}
