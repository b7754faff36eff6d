//! # Team Orchestration
//!
//! Runs a task through the fixed four-stage pipeline.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Task → Planner → Researcher → Writer → Reviewer → synthesize → store
//! ```
//!
//! Stages run strictly one after another; each sees the results of the
//! stages before it through `RunContext`.

pub mod context;
pub mod coordinator;
pub mod events;
pub mod history;
pub mod pipeline;
pub mod synthesis;

pub use context::RunContext;
pub use coordinator::{
    AgentRoster, Coordinator, CoordinatorConfig, RunResult, StageResults, TeamStatus,
};
pub use events::{TeamEvent, TeamEventKind};
pub use history::{InteractionHistory, InteractionLogEntry};
pub use pipeline::{Pipeline, PipelinePhase, Stage, StageOptions};
pub use synthesis::{synthesize, FinalOutput};
