//! # Reviewer Skill
//!
//! Scores the Writer's content against the original request.

use std::sync::Arc;

use async_trait::async_trait;

use super::output::StageResult;
use super::{context_block, prompts, RoleAdapter};
use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::team::context::RunContext;
use crate::team::pipeline::Stage;

const SYSTEM_PROMPT: &str = prompts::REVIEWER;

pub struct ReviewerSkill {
    backend: Arc<dyn GenerationBackend>,
}

impl ReviewerSkill {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn build_prompt(&self, task: &str, context: &RunContext) -> String {
        let content = context
            .get(Stage::Writing)
            .map(StageResult::to_prompt_json)
            .unwrap_or_else(|| "null".to_string());

        let mut prompt = format!(
            "{}\n\nREVIEW TASK: Please review the following content\nORIGINAL REQUEST: {}\n\nCONTENT TO REVIEW: {}",
            SYSTEM_PROMPT.trim_end(),
            task,
            content
        );

        if let Some(block) = context_block(
            "ADDITIONAL CONTEXT",
            context,
            &[Stage::Planning, Stage::Research],
        ) {
            prompt.push('\n');
            prompt.push_str(&block);
        }

        prompt.push_str(
            "\n\nPlease provide a thorough review and your assessment in the specified JSON format.",
        );
        prompt
    }
}

#[async_trait]
impl RoleAdapter for ReviewerSkill {
    fn stage(&self) -> Stage {
        Stage::Review
    }

    fn description(&self) -> &'static str {
        "ReviewerAgent - Quality assurance and improvement"
    }

    async fn initialize(&self) -> Result<(), BackendError> {
        self.backend.health_check().await
    }

    async fn execute(&self, task: &str, context: &RunContext) -> Result<StageResult, BackendError> {
        let prompt = self.build_prompt(task, context);
        let text = self.backend.generate(&prompt).await?;
        Ok(StageResult::from_generated(Stage::Review, &text))
    }
}
