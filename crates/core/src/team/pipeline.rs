//! # Pipeline Stages
//!
//! Defines the fixed stage order of a team run and the per-run phase machine.

use serde::{Deserialize, Serialize};

/// One phase of the four-stage pipeline. Ordered by execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Strategic planning
    Planning,
    /// Research and information gathering
    Research,
    /// Content creation
    Writing,
    /// Quality review
    Review,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 4] = [
        Stage::Planning,
        Stage::Research,
        Stage::Writing,
        Stage::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Planning => "planning",
            Stage::Research => "research",
            Stage::Writing => "writing",
            Stage::Review => "review",
        }
    }

    /// Name of the agent that owns this stage
    pub fn agent_name(&self) -> &'static str {
        match self {
            Stage::Planning => "PlannerAgent",
            Stage::Research => "ResearchAgent",
            Stage::Writing => "WriterAgent",
            Stage::Review => "ReviewerAgent",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied skip flags, one per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageOptions {
    pub skip_planning: bool,
    pub skip_research: bool,
    pub skip_writing: bool,
    pub skip_review: bool,
}

impl StageOptions {
    pub fn skips(&self, stage: Stage) -> bool {
        match stage {
            Stage::Planning => self.skip_planning,
            Stage::Research => self.skip_research,
            Stage::Writing => self.skip_writing,
            Stage::Review => self.skip_review,
        }
    }

    /// Only run the given stages
    pub fn only(stages: &[Stage]) -> Self {
        Self {
            skip_planning: !stages.contains(&Stage::Planning),
            skip_research: !stages.contains(&Stage::Research),
            skip_writing: !stages.contains(&Stage::Writing),
            skip_review: !stages.contains(&Stage::Review),
        }
    }
}

/// Phase of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    NotStarted,
    PlanningDone,
    ResearchDone,
    WritingDone,
    ReviewDone,
    Synthesized,
    Persisted,
}

impl PipelinePhase {
    fn after(stage: Stage) -> Self {
        match stage {
            Stage::Planning => PipelinePhase::PlanningDone,
            Stage::Research => PipelinePhase::ResearchDone,
            Stage::Writing => PipelinePhase::WritingDone,
            Stage::Review => PipelinePhase::ReviewDone,
        }
    }
}

/// The per-run state machine.
///
/// Transitions only move forward. A stage counts as "done" once it was
/// attempted or skipped, whatever its outcome.
#[derive(Debug, Clone)]
pub struct Pipeline {
    phase: PipelinePhase,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            phase: PipelinePhase::NotStarted,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Whether `stage` may still be attempted in this run
    pub fn can_attempt(&self, stage: Stage) -> bool {
        self.phase < PipelinePhase::after(stage)
    }

    /// Mark `stage` as passed. Returns false (and changes nothing) on a
    /// backward or repeated transition.
    pub fn pass(&mut self, stage: Stage) -> bool {
        if !self.can_attempt(stage) {
            return false;
        }
        self.phase = PipelinePhase::after(stage);
        true
    }

    /// All stages attempted; final output computed
    pub fn synthesize(&mut self) -> bool {
        self.advance_to(PipelinePhase::Synthesized)
    }

    /// Session record written
    pub fn persist(&mut self) -> bool {
        self.phase == PipelinePhase::Synthesized && self.advance_to(PipelinePhase::Persisted)
    }

    fn advance_to(&mut self, next: PipelinePhase) -> bool {
        if next <= self.phase {
            return false;
        }
        self.phase = next;
        true
    }

    pub fn is_synthesized(&self) -> bool {
        self.phase >= PipelinePhase::Synthesized
    }
}
