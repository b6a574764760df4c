//! Pipeline orchestration: Stage-1, early exit, Stage-2, aggregation.

use std::sync::Arc;

use tracing::info;

use gavel_core::aggregate::{Aggregator, Weights};
use gavel_core::prechecks::{default_checkers, PrecheckRunner, DEFAULT_MIN_OVERLAP_THRESHOLD};
use gavel_core::types::{EvaluationContext, EvaluationResult, Verdict};

use crate::config::{ConfigError, JudgesConfig, Settings, DEFAULT_EARLY_EXIT_THRESHOLD};
use crate::judge::{Judge, JudgeFactory, JudgeNotFound, JudgePool, JudgeRunner};
use crate::llm::LlmClient;

/// Score a single judge must beat for a `pass` on the single-judge path.
pub const DEFAULT_SINGLE_JUDGE_THRESHOLD: f64 = 0.7;

/// The full two-stage pipeline.
///
/// Early exit is a cost optimisation: when the pre-checks already
/// condemn the answer, no LLM is ever invoked.
pub struct PipelineExecutor {
    prechecks: PrecheckRunner,
    judges: JudgeRunner,
    aggregator: Aggregator,
    early_exit_threshold: f64,
}

impl PipelineExecutor {
    pub fn new(
        prechecks: PrecheckRunner,
        judges: JudgeRunner,
        aggregator: Aggregator,
        early_exit_threshold: f64,
    ) -> Self {
        Self {
            prechecks,
            judges,
            aggregator,
            early_exit_threshold,
        }
    }

    /// Start assembling a pipeline piece by piece.
    pub fn builder() -> PipelineExecutorBuilder {
        PipelineExecutorBuilder::new()
    }

    /// Assemble the default checker bank and the configured judges into
    /// a ready-to-serve pipeline.
    pub fn from_config(
        settings: &Settings,
        config: &JudgesConfig,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, ConfigError> {
        let judges = JudgePool::new(client).build(config)?;

        Self::builder()
            .prechecks(PrecheckRunner::new(default_checkers(
                settings.min_overlap_threshold,
            )))
            .judges(judges)
            .weights(Weights {
                prechecks: settings.precheck_weight,
                llm_judge: settings.llm_judge_weight,
            })
            .early_exit_threshold(settings.early_exit_threshold)
            .build()
    }

    /// Evaluate one context end to end.
    ///
    /// Cancellation is cooperative: dropping the returned future aborts
    /// every in-flight judge task and LLM call.
    pub async fn execute(&self, ctx: &EvaluationContext) -> EvaluationResult {
        info!(request_id = %ctx.request_id, "starting evaluation");

        let precheck_results = self.prechecks.run(ctx);
        if precheck_results.is_empty() {
            return EvaluationResult::failed(ctx.request_id.clone());
        }

        let avg_score = precheck_results.iter().map(|s| s.score).sum::<f64>()
            / precheck_results.len() as f64;

        if avg_score < self.early_exit_threshold {
            info!(request_id = %ctx.request_id, avg_score, "early exit triggered");
            return EvaluationResult {
                id: ctx.request_id.clone(),
                stages: precheck_results,
                confidence: 0.0,
                verdict: Verdict::Fail,
            };
        }

        let judge_results = self.judges.run(ctx).await;

        let result = self
            .aggregator
            .aggregate(&ctx.request_id, precheck_results, judge_results);

        info!(
            request_id = %result.id,
            verdict = %result.verdict,
            confidence = result.confidence,
            "evaluation complete"
        );
        result
    }
}

/// Builder for [`PipelineExecutor`].
///
/// Checkers default to the canonical bank and the threshold to
/// [`DEFAULT_EARLY_EXIT_THRESHOLD`]; judges have no default, so a build
/// with none registered is an error.
pub struct PipelineExecutorBuilder {
    prechecks: Option<PrecheckRunner>,
    judges: Vec<Arc<dyn Judge>>,
    weights: Weights,
    early_exit_threshold: f64,
}

impl PipelineExecutorBuilder {
    pub fn new() -> Self {
        Self {
            prechecks: None,
            judges: Vec::new(),
            weights: Weights::default(),
            early_exit_threshold: DEFAULT_EARLY_EXIT_THRESHOLD,
        }
    }

    /// Replace the default checker bank.
    pub fn prechecks(mut self, prechecks: PrecheckRunner) -> Self {
        self.prechecks = Some(prechecks);
        self
    }

    /// Register a single judge.
    pub fn judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judges.push(judge);
        self
    }

    /// Register a whole judge set.
    pub fn judges(mut self, judges: Vec<Arc<dyn Judge>>) -> Self {
        self.judges.extend(judges);
        self
    }

    /// Set the aggregation weights.
    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the pre-check mean below which judges are skipped.
    pub fn early_exit_threshold(mut self, threshold: f64) -> Self {
        self.early_exit_threshold = threshold;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<PipelineExecutor, ConfigError> {
        if self.judges.is_empty() {
            return Err(ConfigError::NoEnabledJudges);
        }

        let prechecks = self
            .prechecks
            .unwrap_or_else(|| PrecheckRunner::new(default_checkers(DEFAULT_MIN_OVERLAP_THRESHOLD)));

        Ok(PipelineExecutor::new(
            prechecks,
            JudgeRunner::new(self.judges),
            Aggregator::new(self.weights),
            self.early_exit_threshold,
        ))
    }
}

impl Default for PipelineExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Alternate entry point: run one named judge and threshold its score.
pub struct SingleJudgeExecutor {
    factory: JudgeFactory,
}

impl SingleJudgeExecutor {
    pub fn new(factory: JudgeFactory) -> Self {
        Self { factory }
    }

    /// Evaluate one context with one judge.
    ///
    /// An unknown judge name is an error surfaced to the caller, not a
    /// `fail` verdict. The verdict is `pass` iff the score strictly
    /// exceeds `threshold`; `review` is never produced here.
    pub async fn execute(
        &self,
        judge_name: &str,
        threshold: f64,
        ctx: &EvaluationContext,
    ) -> Result<EvaluationResult, JudgeNotFound> {
        info!(
            request_id = %ctx.request_id,
            judge = judge_name,
            threshold,
            "starting single-judge evaluation"
        );

        let judge = self.factory.get(judge_name)?;
        let stage = judge.evaluate(ctx).await;

        let confidence = stage.score;
        let verdict = if stage.score > threshold {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        Ok(EvaluationResult {
            id: ctx.request_id.clone(),
            stages: vec![stage],
            confidence,
            verdict,
        })
    }
}

/// Both executors wired from one judge pool.
pub struct Engine {
    pub pipeline: PipelineExecutor,
    pub single_judge: SingleJudgeExecutor,
}

/// Assemble the default pre-check bank, the configured judges, and the
/// aggregator into a ready-to-serve engine.
pub fn wire(
    settings: &Settings,
    config: &JudgesConfig,
    client: Arc<dyn LlmClient>,
) -> Result<Engine, ConfigError> {
    let judges = JudgePool::new(client).build(config)?;
    let factory = JudgeFactory::new(&judges);

    let pipeline = PipelineExecutor::builder()
        .prechecks(PrecheckRunner::new(default_checkers(
            settings.min_overlap_threshold,
        )))
        .judges(judges)
        .weights(Weights {
            prechecks: settings.precheck_weight,
            llm_judge: settings.llm_judge_weight,
        })
        .early_exit_threshold(settings.early_exit_threshold)
        .build()?;

    Ok(Engine {
        pipeline,
        single_judge: SingleJudgeExecutor::new(factory),
    })
}
