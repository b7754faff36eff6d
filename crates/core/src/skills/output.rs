//! # Stage Outputs
//!
//! Structured records produced by the role adapters, and the pure
//! parse-or-fallback function that turns raw generated text into one.
//!
//! ```text
//! raw text ──▶ parse_structured(stage, text)
//!                 ├── Ok(StageOutput::{Plan,Research,Writing,Review})
//!                 └── Err(FallbackOutput { field, raw_text })
//! ```
//!
//! A record is structured when the text is a JSON object whose role anchor
//! field is present with the right type (`task_analysis`, `findings`,
//! `content`, `overall_score`). Other fields default when missing.
//! Parsing happens once; malformed structure is never repaired.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::team::pipeline::Stage;

/// Treat an explicit JSON `null` like a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Planner output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanOutput {
    /// Breakdown of the request
    pub task_analysis: String,
    /// Phases, agents, objectives and deliverables
    #[serde(default)]
    pub execution_plan: serde_json::Value,
    #[serde(default, deserialize_with = "null_default")]
    pub success_criteria: Vec<String>,
    /// "low", "medium" or "high"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_considerations: Option<String>,
}

/// Researcher output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchOutput {
    #[serde(default, deserialize_with = "null_default")]
    pub research_areas: Vec<String>,
    /// Detailed research summary
    pub findings: String,
    #[serde(default, deserialize_with = "null_default")]
    pub key_insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

/// Writer output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WritingOutput {
    /// "article", "report", "proposal" or "summary"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub key_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions_for_review: Option<String>,
}

/// Reviewer output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewOutput {
    pub overall_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_summary: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub areas_for_improvement: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub specific_suggestions: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check_notes: Option<String>,
    /// "approve", "revise" or "major_revision_needed"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_recommendation: Option<String>,
}

/// Raw text kept when the generated output was not structured
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackOutput {
    /// Role-appropriate field the text stands in for (e.g. `findings`)
    pub field: String,
    pub raw_text: String,
}

/// Payload of a stage result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum StageOutput {
    Plan(PlanOutput),
    Research(ResearchOutput),
    Writing(WritingOutput),
    Review(ReviewOutput),
    Fallback(FallbackOutput),
}

/// Which search queries the Researcher attempted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchTrace {
    pub queries: Vec<String>,
    /// At least one query was answered by the search provider
    pub search_performed: bool,
}

/// Output of one stage execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageResult {
    pub role: Stage,
    pub timestamp: DateTime<Utc>,
    pub output: StageOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchTrace>,
}

impl StageResult {
    pub fn new(role: Stage, output: StageOutput) -> Self {
        Self {
            role,
            timestamp: Utc::now(),
            output,
            search: None,
        }
    }

    /// Parse raw generated text for `role`, falling back to the raw text.
    pub fn from_generated(role: Stage, text: &str) -> Self {
        let output = parse_structured(role, text).unwrap_or_else(StageOutput::Fallback);
        Self::new(role, output)
    }

    pub fn with_search(mut self, trace: SearchTrace) -> Self {
        self.search = Some(trace);
        self
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.output, StageOutput::Fallback(_))
    }

    /// Raw text when this result took the fallback branch
    pub fn raw_text(&self) -> Option<&str> {
        match &self.output {
            StageOutput::Fallback(f) => Some(&f.raw_text),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.output {
            StageOutput::Writing(w) => w.title.as_deref(),
            _ => None,
        }
    }

    /// Written content, structured or raw
    pub fn content(&self) -> Option<&str> {
        match &self.output {
            StageOutput::Writing(w) => Some(&w.content),
            StageOutput::Fallback(f) if self.role == Stage::Writing => Some(&f.raw_text),
            _ => None,
        }
    }

    /// Research findings, structured or raw
    pub fn findings(&self) -> Option<&str> {
        match &self.output {
            StageOutput::Research(r) => Some(&r.findings),
            StageOutput::Fallback(f) if self.role == Stage::Research => Some(&f.raw_text),
            _ => None,
        }
    }

    pub fn key_insights(&self) -> Option<&[String]> {
        match &self.output {
            StageOutput::Research(r) => Some(&r.key_insights),
            _ => None,
        }
    }

    pub fn overall_score(&self) -> Option<f64> {
        match &self.output {
            StageOutput::Review(r) => Some(r.overall_score),
            _ => None,
        }
    }

    pub fn final_recommendation(&self) -> Option<&str> {
        match &self.output {
            StageOutput::Review(r) => r.final_recommendation.as_deref(),
            _ => None,
        }
    }

    /// JSON rendering used when this result is fed into a later prompt
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self.output))
    }
}

/// Field that carries the raw text when `stage` output is not structured
pub fn fallback_field(stage: Stage) -> &'static str {
    match stage {
        Stage::Planning => "task_analysis",
        Stage::Research => "findings",
        Stage::Writing => "content",
        Stage::Review => "review_summary",
    }
}

/// Parse generated text into the structured record for `stage`.
///
/// Returns the fallback record carrying the exact input text on failure.
pub fn parse_structured(stage: Stage, text: &str) -> Result<StageOutput, FallbackOutput> {
    let fallback = || FallbackOutput {
        field: fallback_field(stage).to_string(),
        raw_text: text.to_string(),
    };

    let value: serde_json::Value = match serde_json::from_str(text.trim()) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        _ => return Err(fallback()),
    };

    let parsed = match stage {
        Stage::Planning => serde_json::from_value(value).map(StageOutput::Plan),
        Stage::Research => serde_json::from_value(value).map(StageOutput::Research),
        Stage::Writing => serde_json::from_value(value).map(StageOutput::Writing),
        Stage::Review => serde_json::from_value(value).map(StageOutput::Review),
    };

    parsed.map_err(|_| fallback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformant_writer_json_is_structured() {
        let text = r#"{
            "agent": "WriterAgent",
            "content_type": "article",
            "title": "Quantum Tunneling",
            "content": "Particles cross barriers.",
            "word_count": 3
        }"#;
        let output = parse_structured(Stage::Writing, text).unwrap();
        match output {
            StageOutput::Writing(w) => {
                assert_eq!(w.title.as_deref(), Some("Quantum Tunneling"));
                assert_eq!(w.content, "Particles cross barriers.");
                assert_eq!(w.word_count, Some(3));
            }
            other => panic!("expected writing output, got {:?}", other),
        }
    }

    #[test]
    fn test_prose_falls_back_with_exact_text() {
        let text = "  Here is my research: the sky is blue.\n";
        let fallback = parse_structured(Stage::Research, text).unwrap_err();
        assert_eq!(fallback.field, "findings");
        assert_eq!(fallback.raw_text, text);
    }

    #[test]
    fn test_missing_anchor_field_falls_back() {
        let text = r#"{"strengths": ["clear"], "final_recommendation": "approve"}"#;
        let fallback = parse_structured(Stage::Review, text).unwrap_err();
        assert_eq!(fallback.field, "review_summary");
    }

    #[test]
    fn test_wrong_anchor_type_falls_back() {
        let text = r#"{"overall_score": "eight", "final_recommendation": "approve"}"#;
        assert!(parse_structured(Stage::Review, text).is_err());
    }

    #[test]
    fn test_json_array_is_not_structured() {
        let text = r#"["task", {}, []]"#;
        assert!(parse_structured(Stage::Planning, text).is_err());
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let text = r#"{"findings": "done", "key_insights": null}"#;
        match parse_structured(Stage::Research, text).unwrap() {
            StageOutput::Research(r) => assert!(r.key_insights.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fallback_accessors() {
        let result = StageResult::from_generated(Stage::Writing, "just prose");
        assert!(result.is_fallback());
        assert_eq!(result.content(), Some("just prose"));
        assert_eq!(result.title(), None);
        assert_eq!(result.findings(), None);
    }

    #[test]
    fn test_stage_result_serialization_round_trip() {
        let result = StageResult::from_generated(
            Stage::Review,
            r#"{"overall_score": 8.5, "final_recommendation": "approve"}"#,
        )
        .with_search(SearchTrace::default());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"format\":\"review\""));
        assert!(json.contains("\"role\":\"review\""));

        let back: StageResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.overall_score(), Some(8.5));
        assert_eq!(back.final_recommendation(), Some("approve"));
    }
}
