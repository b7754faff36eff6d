//! # Collab Core
//!
//! The "Brain" of the Collab system - the team pipeline, role adapters,
//! generation backends, and session storage.
//!
//! ## Architecture
//!
//! - `backend/` - Local (Ollama) and remote (Gemini) text generation
//! - `models` - Backend selection from the environment
//! - `skills/` - Planner, Researcher, Writer and Reviewer role adapters
//! - `tools/` - Search query heuristic and web search providers
//! - `team/` - Pipeline, synthesis, history and the coordinator
//! - `state/` - SQLite session store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use collab_core::models::ModelConfig;
//! use collab_core::skills::Team;
//! use collab_core::state::{CollabDb, SessionManager};
//! use collab_core::team::{Coordinator, CoordinatorConfig, StageOptions};
//! use collab_core::tools::SearchConfig;
//!
//! let backend = ModelConfig::from_env().create_backend()?;
//! let search = SearchConfig::from_env().create_provider();
//! let team = Team::assemble(backend, search).await?;
//!
//! let db = CollabDb::open()?;
//! let coordinator = Coordinator::new(
//!     team,
//!     Arc::new(SessionManager::new(&db)),
//!     CoordinatorConfig::default(),
//! );
//! let result = coordinator.run("Explain quantum tunneling", StageOptions::default()).await;
//! println!("{}", result.final_output.summary());
//! ```

pub mod backend;
pub mod error;
pub mod models;
pub mod skills;
pub mod state;
pub mod team;
pub mod tools;

pub use error::{BackendError, SearchError};
