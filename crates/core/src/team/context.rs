//! Accumulated stage results for one run.

use serde::{Deserialize, Serialize};

use super::pipeline::Stage;
use crate::skills::output::StageResult;

/// Stage results produced so far in the current run, in stage order.
///
/// Only the coordinator appends; role adapters get a shared reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunContext {
    results: Vec<StageResult>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: Stage) -> Option<&StageResult> {
        self.results.iter().find(|r| r.role == stage)
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.results.iter().map(|r| r.role).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Append a result. Rejects a stage that is out of order or already present.
    pub(crate) fn push(&mut self, result: StageResult) -> bool {
        if let Some(last) = self.results.last() {
            if last.role >= result.role {
                return false;
            }
        }
        self.results.push(result);
        true
    }

    pub fn into_results(self) -> Vec<StageResult> {
        self.results
    }
}
