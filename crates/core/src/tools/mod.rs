//! # Research Tools
//!
//! - `query` - search query heuristic over the task text
//! - `search` - web search providers (Google Custom Search, SearXNG, simulated)

pub mod query;
pub mod search;

pub use query::extract_search_queries;
pub use search::{SearchConfig, SearchHit, SearchProvider, SearchResponse, SimulatedSearch};
