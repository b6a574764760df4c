//! Stage-2: LLM judges.
//!
//! A judge scores one `(query, answer, context)` triple by prompting a
//! model and parsing its `{score, reason}` reply. Judge failures are
//! data, not errors: every failure mode is encoded as a zero-score
//! [`StageResult`] so aggregation sees uniformly shaped input.

mod factory;
mod llm_judge;
mod pool;
mod runner;

pub use factory::{JudgeFactory, JudgeNotFound};
pub use llm_judge::LlmJudge;
pub use pool::JudgePool;
pub use runner::{JudgeRunner, JUDGE_TIMEOUT};

use async_trait::async_trait;
use gavel_core::types::{EvaluationContext, StageResult};

/// An LLM-backed evaluator.
///
/// # Isolation Contract
/// - Stateless after construction; safe for concurrent `evaluate` calls
/// - No access to other judges' results
/// - Never returns an error: failures degrade the score instead
#[async_trait]
pub trait Judge: Send + Sync + std::fmt::Debug {
    /// The configured judge name, without the `-judge` suffix.
    fn name(&self) -> &str;

    /// Score the context, recording elapsed time regardless of outcome.
    async fn evaluate(&self, ctx: &EvaluationContext) -> StageResult;
}
