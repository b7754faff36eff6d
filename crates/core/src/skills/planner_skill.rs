//! # Planner Skill
//!
//! Breaks the task into an execution plan for the rest of the team.
//! Runs first, so it never sees earlier stage output.

use std::sync::Arc;

use async_trait::async_trait;

use super::output::StageResult;
use super::prompts;
use super::RoleAdapter;
use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::team::context::RunContext;
use crate::team::pipeline::Stage;

const SYSTEM_PROMPT: &str = prompts::PLANNER;

pub struct PlannerSkill {
    backend: Arc<dyn GenerationBackend>,
}

impl PlannerSkill {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn build_prompt(&self, task: &str, _context: &RunContext) -> String {
        format!(
            "{}\n\nPLANNING TASK: {}\n\n\
             Please analyze this request and create a detailed execution plan for the team \
             (ResearchAgent, WriterAgent, ReviewerAgent). Provide your plan in the specified JSON format.",
            SYSTEM_PROMPT.trim_end(),
            task
        )
    }
}

#[async_trait]
impl RoleAdapter for PlannerSkill {
    fn stage(&self) -> Stage {
        Stage::Planning
    }

    fn description(&self) -> &'static str {
        "PlannerAgent - Strategic planning and task coordination"
    }

    async fn initialize(&self) -> Result<(), BackendError> {
        self.backend.health_check().await
    }

    async fn execute(&self, task: &str, context: &RunContext) -> Result<StageResult, BackendError> {
        let prompt = self.build_prompt(task, context);
        let text = self.backend.generate(&prompt).await?;
        Ok(StageResult::from_generated(Stage::Planning, &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::output::StageOutput;
    use crate::skills::test_support::StaticBackend;

    #[tokio::test]
    async fn test_structured_plan() {
        let backend = StaticBackend::new(
            r#"{"task_analysis": "two parts", "success_criteria": ["clear"], "estimated_complexity": "low"}"#,
        );
        let skill = PlannerSkill::new(backend.clone());
        let result = skill.execute("Plan a launch", &RunContext::new()).await.unwrap();

        assert_eq!(result.role, Stage::Planning);
        match result.output {
            StageOutput::Plan(plan) => {
                assert_eq!(plan.task_analysis, "two parts");
                assert_eq!(plan.estimated_complexity.as_deref(), Some("low"));
            }
            other => panic!("expected plan, got {:?}", other),
        }

        let prompt = backend.last_prompt().unwrap();
        assert!(prompt.contains("PLANNING TASK: Plan a launch"));
        assert!(prompt.contains("\"task_analysis\""));
    }

    #[tokio::test]
    async fn test_prose_plan_falls_back() {
        let skill = PlannerSkill::new(StaticBackend::new("First research, then write."));
        let result = skill.execute("Plan", &RunContext::new()).await.unwrap();
        assert!(result.is_fallback());
        assert_eq!(result.raw_text(), Some("First research, then write."));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let skill = PlannerSkill::new(StaticBackend::failing(BackendError::config("no key")));
        let err = skill.execute("Plan", &RunContext::new()).await.unwrap_err();
        assert_eq!(err, BackendError::config("no key"));
    }
}
