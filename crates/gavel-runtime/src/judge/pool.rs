//! Builds the judge set from declarative configuration.

use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigError, JudgesConfig};
use crate::llm::LlmClient;

use super::{Judge, LlmJudge};

/// Materialises judges from a validated [`JudgesConfig`].
///
/// Disabled entries are skipped silently; any construction failure is
/// fatal to the whole build, and a build yielding zero judges is an
/// error.
pub struct JudgePool {
    client: Arc<dyn LlmClient>,
}

impl JudgePool {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Build one judge per enabled configuration entry.
    pub fn build(&self, config: &JudgesConfig) -> Result<Vec<Arc<dyn Judge>>, ConfigError> {
        let mut judges: Vec<Arc<dyn Judge>> = Vec::new();

        for spec in &config.judges.evaluators {
            if !spec.enabled {
                info!(judge = %spec.name, "judge disabled in config, skipping");
                continue;
            }

            let model = spec.resolved_model(&config.judges.default_model);
            let judge = LlmJudge::new(spec, model, Arc::clone(&self.client))?;

            info!(
                judge = %spec.name,
                max_tokens = model.max_tokens,
                temperature = model.temperature,
                retry = model.retry,
                requires_context = spec.requires_context,
                "judge created"
            );
            judges.push(Arc::new(judge));
        }

        if judges.is_empty() {
            return Err(ConfigError::NoEnabledJudges);
        }

        info!(total_judges = judges.len(), "judge pool built");
        Ok(judges)
    }
}
