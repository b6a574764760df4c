//! Config-driven judge implementation.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use gavel_core::types::{EvaluationContext, StageResult};

use crate::config::{ConfigError, JudgeSpec, ModelConfig};
use crate::llm::{CompletionRequest, LlmClient};
use crate::template::PromptTemplate;

use super::Judge;

impl std::fmt::Debug for LlmJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmJudge").field("name", &self.name).finish()
    }
}

/// Shape every judge completion must take.
#[derive(Debug, Deserialize)]
struct JudgeResponse {
    #[serde(default)]
    score: f64,

    #[serde(default)]
    reason: String,
}

/// A judge whose behavior is entirely described by a [`JudgeSpec`]:
/// prompt template, model parameters, and context requirement.
pub struct LlmJudge {
    name: String,
    stage_name: String,
    template: PromptTemplate,
    model: ModelConfig,
    requires_context: bool,
    client: Arc<dyn LlmClient>,
}

impl LlmJudge {
    /// Build a judge from its validated spec and resolved model.
    pub fn new(
        spec: &JudgeSpec,
        model: ModelConfig,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, ConfigError> {
        let template =
            PromptTemplate::parse(&spec.prompt).map_err(|source| ConfigError::InvalidTemplate {
                name: spec.name.clone(),
                source,
            })?;

        Ok(Self {
            stage_name: format!("{}-judge", spec.name),
            name: spec.name.clone(),
            template,
            model,
            requires_context: spec.requires_context,
            client,
        })
    }
}

#[async_trait]
impl Judge for LlmJudge {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult {
        let started = Instant::now();

        if self.requires_context && !ctx.has_context() {
            warn!(judge = %self.name, "judge requires context but none was provided");
            return StageResult::failed(
                &self.stage_name,
                "Context required but not provided",
                started.elapsed(),
            );
        }

        let request = CompletionRequest {
            prompt: self.template.render(ctx),
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
        };

        let response = if self.model.retry {
            self.client.invoke_with_retry(&request).await
        } else {
            self.client.invoke(&request).await
        };

        let completion = match response {
            Ok(completion) => completion,
            Err(e) => {
                error!(judge = %self.name, error = %e, "LLM call failed");
                return StageResult::failed(&self.stage_name, "Failed to call LLM", started.elapsed());
            }
        };

        let content = strip_code_fence(&completion.content);
        let parsed: JudgeResponse = match serde_json::from_str(content) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(
                    judge = %self.name,
                    error = %e,
                    content = %completion.content,
                    "failed to deserialize LLM response"
                );
                return StageResult::failed(
                    &self.stage_name,
                    "Failed to deserialize LLM response",
                    started.elapsed(),
                );
            }
        };

        if parsed.score == 0.0 && parsed.reason.is_empty() {
            error!(judge = %self.name, "LLM returned empty score and reason");
            return StageResult::failed(
                &self.stage_name,
                "Invalid LLM response: missing score and reason",
                started.elapsed(),
            );
        }

        if !(0.0..=1.0).contains(&parsed.score) {
            error!(judge = %self.name, score = parsed.score, "LLM returned out-of-range score");
            return StageResult::failed(
                &self.stage_name,
                format!(
                    "Invalid LLM response: score {} out of range [0.0, 1.0]",
                    parsed.score
                ),
                started.elapsed(),
            );
        }

        debug!(judge = %self.name, score = parsed.score, "judge completed");
        StageResult {
            name: self.stage_name.clone(),
            score: parsed.score,
            reason: parsed.reason,
            duration: started.elapsed(),
        }
    }
}

/// Remove a single surrounding triple-backtick fence, if present.
///
/// Handles both ``` and ```json fences. Already-unfenced input is
/// returned untouched, so stripping is idempotent.
fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();
    if !content.starts_with("```") {
        return content;
    }

    let Some(first_newline) = content.find('\n') else {
        return content;
    };
    let Some(closing) = content.rfind("```") else {
        return content;
    };
    if closing <= first_newline {
        return content;
    }

    content[first_newline + 1..closing].trim()
}
