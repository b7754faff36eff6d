//! # Result Synthesis
//!
//! Picks the single final output of a run from whichever stage results
//! exist. First matching rule wins:
//!
//! | Present            | Output             |
//! |--------------------|--------------------|
//! | Review + Writing   | `reviewed_content` |
//! | Writing            | `content`          |
//! | Research           | `research_summary` |
//! | anything else      | `planning_only`    |

use serde::{Deserialize, Serialize};

use crate::skills::output::StageResult;

/// Title used when the Writer gave none
pub const DEFAULT_TITLE: &str = "untitled";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FinalOutput {
    ReviewedContent {
        title: String,
        content: String,
        /// `None` when the review was not structured
        quality_score: Option<f64>,
        recommendations_applied: bool,
        summary: String,
    },
    Content {
        title: String,
        content: String,
        summary: String,
    },
    ResearchSummary {
        findings: String,
        key_insights: Vec<String>,
        summary: String,
    },
    PlanningOnly {
        plan: Option<StageResult>,
        summary: String,
    },
}

impl FinalOutput {
    /// Wire name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            FinalOutput::ReviewedContent { .. } => "reviewed_content",
            FinalOutput::Content { .. } => "content",
            FinalOutput::ResearchSummary { .. } => "research_summary",
            FinalOutput::PlanningOnly { .. } => "planning_only",
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            FinalOutput::ReviewedContent { summary, .. }
            | FinalOutput::Content { summary, .. }
            | FinalOutput::ResearchSummary { summary, .. }
            | FinalOutput::PlanningOnly { summary, .. } => summary,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            FinalOutput::ReviewedContent { title, .. } | FinalOutput::Content { title, .. } => {
                Some(title)
            }
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FinalOutput::ReviewedContent { content, .. } | FinalOutput::Content { content, .. } => {
                Some(content)
            }
            _ => None,
        }
    }
}

/// Build the final output for `task` from the available stage results.
pub fn synthesize(
    task: &str,
    planning: Option<&StageResult>,
    research: Option<&StageResult>,
    writing: Option<&StageResult>,
    review: Option<&StageResult>,
) -> FinalOutput {
    if let (Some(review), Some(writing)) = (review, writing) {
        let quality_score = review.overall_score();
        let score = quality_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        return FinalOutput::ReviewedContent {
            title: title_of(writing),
            content: writing.content().unwrap_or_default().to_string(),
            quality_score,
            recommendations_applied: review.final_recommendation() == Some("approve"),
            summary: format!(
                "The team successfully completed the task: \"{}\". Research findings were \
                 incorporated into well-structured content, which received a quality score of {}.",
                task, score
            ),
        };
    }

    if let Some(writing) = writing {
        return FinalOutput::Content {
            title: title_of(writing),
            content: writing.content().unwrap_or_default().to_string(),
            summary: format!("The team created content for: \"{}\"", task),
        };
    }

    if let Some(research) = research {
        return FinalOutput::ResearchSummary {
            findings: research.findings().unwrap_or_default().to_string(),
            key_insights: research.key_insights().map(<[String]>::to_vec).unwrap_or_default(),
            summary: format!("The team conducted research on: \"{}\"", task),
        };
    }

    let summary = if planning.is_some() {
        format!(
            "The team analyzed the request: \"{}\" and created an execution plan.",
            task
        )
    } else {
        format!("The team could not complete any stage for: \"{}\".", task)
    };
    FinalOutput::PlanningOnly {
        plan: planning.cloned(),
        summary,
    }
}

fn title_of(writing: &StageResult) -> String {
    writing
        .title()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::pipeline::Stage;

    fn result(stage: Stage, text: &str) -> StageResult {
        StageResult::from_generated(stage, text)
    }

    #[test]
    fn test_review_and_writing_win_regardless_of_others() {
        let writing = result(Stage::Writing, r#"{"title": "Tides", "content": "Moon."}"#);
        let review = result(
            Stage::Review,
            r#"{"overall_score": 8.5, "final_recommendation": "approve"}"#,
        );
        let research = result(Stage::Research, "notes");

        for (planning, research) in [(None, None), (Some(&research), Some(&research))] {
            let output = synthesize("Explain tides", planning, research, Some(&writing), Some(&review));
            match output {
                FinalOutput::ReviewedContent {
                    title,
                    content,
                    quality_score,
                    recommendations_applied,
                    summary,
                } => {
                    assert_eq!(title, "Tides");
                    assert_eq!(content, "Moon.");
                    assert_eq!(quality_score, Some(8.5));
                    assert!(recommendations_applied);
                    assert!(summary.contains("\"Explain tides\""));
                    assert!(summary.ends_with("quality score of 8.5."));
                }
                other => panic!("expected reviewed_content, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unstructured_review_reports_na() {
        let writing = result(Stage::Writing, "prose content");
        let review = result(Stage::Review, "seems fine");
        let output = synthesize("t", None, None, Some(&writing), Some(&review));

        assert_eq!(output.kind(), "reviewed_content");
        assert_eq!(output.title(), Some(DEFAULT_TITLE));
        assert_eq!(output.content(), Some("prose content"));
        assert!(output.summary().ends_with("quality score of N/A."));
        if let FinalOutput::ReviewedContent {
            recommendations_applied,
            ..
        } = output
        {
            assert!(!recommendations_applied);
        }
    }

    #[test]
    fn test_writing_only() {
        let writing = result(Stage::Writing, r#"{"content": "Body", "title": ""}"#);
        let output = synthesize("Explain quantum tunneling", None, None, Some(&writing), None);
        assert_eq!(output.kind(), "content");
        assert_eq!(output.title(), Some("untitled"));
        assert_eq!(output.content(), Some("Body"));
        assert_eq!(
            output.summary(),
            "The team created content for: \"Explain quantum tunneling\""
        );
    }

    #[test]
    fn test_research_summary() {
        let research = result(
            Stage::Research,
            r#"{"findings": "Bees dance", "key_insights": ["waggle", "round"]}"#,
        );
        let planning = result(Stage::Planning, "plan");
        let output = synthesize("bees", Some(&planning), Some(&research), None, None);
        match output {
            FinalOutput::ResearchSummary {
                findings,
                key_insights,
                ..
            } => {
                assert_eq!(findings, "Bees dance");
                assert_eq!(key_insights, vec!["waggle", "round"]);
            }
            other => panic!("expected research_summary, got {:?}", other),
        }
    }

    #[test]
    fn test_nothing_present_gives_null_plan() {
        let output = synthesize("X", None, None, None, None);
        assert_eq!(output.kind(), "planning_only");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["type"], "planning_only");
        assert!(json["plan"].is_null());
    }

    #[test]
    fn test_planning_only_keeps_plan() {
        let planning = result(Stage::Planning, r#"{"task_analysis": "split it"}"#);
        let output = synthesize("X", Some(&planning), None, None, None);
        match output {
            FinalOutput::PlanningOnly { plan, summary } => {
                assert_eq!(plan, Some(planning));
                assert!(summary.contains("created an execution plan"));
            }
            other => panic!("expected planning_only, got {:?}", other),
        }
    }
}
