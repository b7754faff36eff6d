//! Role framings bundled at compile time.

/// Planner - strategic planning and coordination
pub const PLANNER: &str = include_str!("defaults/planner.md");

/// Researcher - information gathering and analysis
pub const RESEARCHER: &str = include_str!("defaults/researcher.md");

/// Writer - content creation
pub const WRITER: &str = include_str!("defaults/writer.md");

/// Reviewer - quality assurance
pub const REVIEWER: &str = include_str!("defaults/reviewer.md");

/// Notice used in place of a query's results when search fails
pub const SEARCH_UNAVAILABLE: &str =
    "Web search is currently unavailable for this query. Continue with existing knowledge.";

/// All framings with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("planner", PLANNER),
        ("researcher", RESEARCHER),
        ("writer", WRITER),
        ("reviewer", REVIEWER),
    ]
}
