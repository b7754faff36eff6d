//! # Writer Skill
//!
//! Turns the research output (and the plan, when present) into content.

use std::sync::Arc;

use async_trait::async_trait;

use super::output::StageResult;
use super::{context_block, prompts, RoleAdapter};
use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::team::context::RunContext;
use crate::team::pipeline::Stage;

const SYSTEM_PROMPT: &str = prompts::WRITER;

pub struct WriterSkill {
    backend: Arc<dyn GenerationBackend>,
}

impl WriterSkill {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn build_prompt(&self, task: &str, context: &RunContext) -> String {
        let mut prompt = format!("{}\n\nWRITING TASK: {}", SYSTEM_PROMPT.trim_end(), task);

        if let Some(research) = context.get(Stage::Research) {
            prompt.push_str("\nRESEARCH DATA: ");
            prompt.push_str(&research.to_prompt_json());
        }
        if let Some(block) = context_block("ADDITIONAL CONTEXT", context, &[Stage::Planning]) {
            prompt.push('\n');
            prompt.push_str(&block);
        }

        prompt.push_str(
            "\n\nPlease create well-structured content based on this information and provide \
             your output in the specified JSON format.",
        );
        prompt
    }
}

#[async_trait]
impl RoleAdapter for WriterSkill {
    fn stage(&self) -> Stage {
        Stage::Writing
    }

    fn description(&self) -> &'static str {
        "WriterAgent - Content creation and structured writing"
    }

    async fn initialize(&self) -> Result<(), BackendError> {
        self.backend.health_check().await
    }

    async fn execute(&self, task: &str, context: &RunContext) -> Result<StageResult, BackendError> {
        let prompt = self.build_prompt(task, context);
        let text = self.backend.generate(&prompt).await?;
        Ok(StageResult::from_generated(Stage::Writing, &text))
    }
}
