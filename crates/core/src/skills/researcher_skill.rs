//! # Researcher Skill
//!
//! Gathers information for the Writer. Before generating, it runs the
//! search-query heuristic over the task and appends the web results of
//! every query to the prompt. A failed search only replaces that query's
//! results with a notice.

use std::sync::Arc;

use async_trait::async_trait;

use super::output::{SearchTrace, StageResult};
use super::{context_block, prompts, RoleAdapter};
use crate::backend::GenerationBackend;
use crate::error::BackendError;
use crate::team::context::RunContext;
use crate::team::pipeline::Stage;
use crate::tools::query::extract_search_queries;
use crate::tools::search::SearchProvider;

const SYSTEM_PROMPT: &str = prompts::RESEARCHER;

/// Results requested per query
pub const DEFAULT_MAX_RESULTS: usize = 3;

pub struct ResearcherSkill {
    backend: Arc<dyn GenerationBackend>,
    search: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl ResearcherSkill {
    pub fn new(backend: Arc<dyn GenerationBackend>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            backend,
            search,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Run the search step for `task`.
    ///
    /// Returns the trace and the combined results block, if any query was emitted.
    pub async fn web_search(&self, task: &str) -> (SearchTrace, Option<String>) {
        let queries = extract_search_queries(task);
        if queries.is_empty() {
            return (SearchTrace::default(), None);
        }
        tracing::debug!(?queries, provider = self.search.name(), "Research search queries");

        let mut search_performed = false;
        let mut sections = Vec::with_capacity(queries.len());
        for query in &queries {
            let summary = match self.search.search(query, self.max_results).await {
                Ok(response) => {
                    search_performed = true;
                    response.summary
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search failed");
                    prompts::SEARCH_UNAVAILABLE.to_string()
                }
            };
            sections.push(format!("**Query: {}**\n{}", query, summary));
        }

        let trace = SearchTrace {
            queries,
            search_performed,
        };
        (trace, Some(sections.join("\n\n---\n\n")))
    }

    pub fn build_prompt(&self, task: &str, context: &RunContext, search_block: Option<&str>) -> String {
        let mut prompt = format!("{}\n\nRESEARCH TASK: {}", SYSTEM_PROMPT.trim_end(), task);

        if let Some(block) = context_block("CONTEXT", context, &[Stage::Planning]) {
            prompt.push('\n');
            prompt.push_str(&block);
        }

        if let Some(results) = search_block {
            prompt.push_str("\n\nWEB SEARCH RESULTS:\n");
            prompt.push_str(results);
        }

        prompt.push_str(
            "\n\nPlease conduct thorough research on this topic and provide your findings \
             in the specified JSON format.",
        );
        prompt
    }
}

#[async_trait]
impl RoleAdapter for ResearcherSkill {
    fn stage(&self) -> Stage {
        Stage::Research
    }

    fn description(&self) -> &'static str {
        "ResearchAgent - Information gathering and analysis"
    }

    async fn initialize(&self) -> Result<(), BackendError> {
        self.backend.health_check().await
    }

    async fn execute(&self, task: &str, context: &RunContext) -> Result<StageResult, BackendError> {
        let (trace, search_block) = self.web_search(task).await;
        let prompt = self.build_prompt(task, context, search_block.as_deref());
        tracing::debug!(prompt_chars = prompt.len(), "Research prompt built");

        let text = self.backend.generate(&prompt).await?;
        Ok(StageResult::from_generated(Stage::Research, &text).with_search(trace))
    }
}
