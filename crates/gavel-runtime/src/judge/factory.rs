//! Judge lookup by name for the single-judge path.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::Judge;

/// Returned when the single-judge path names a judge that was never
/// configured. Surfaced to the caller as an error, never as a verdict.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("judge not found: {0}")]
pub struct JudgeNotFound(pub String);

/// Maps configured judge names to shared judge instances.
///
/// Names are unique by construction: the configuration loader rejects
/// duplicates before a pool is ever built.
pub struct JudgeFactory {
    judges: BTreeMap<String, Arc<dyn Judge>>,
}

impl JudgeFactory {
    pub fn new(judges: &[Arc<dyn Judge>]) -> Self {
        let judges: BTreeMap<String, Arc<dyn Judge>> = judges
            .iter()
            .map(|judge| (judge.name().to_string(), Arc::clone(judge)))
            .collect();

        info!(judge_count = judges.len(), "judge factory initialized");
        Self { judges }
    }

    /// Look a judge up by its configured name (without `-judge` suffix).
    pub fn get(&self, name: &str) -> Result<Arc<dyn Judge>, JudgeNotFound> {
        self.judges
            .get(name)
            .cloned()
            .ok_or_else(|| JudgeNotFound(name.to_string()))
    }

    /// Configured names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.judges.keys().map(|name| name.as_str()).collect()
    }
}
