//! Concurrent fan-out over the judge set.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use gavel_core::types::{EvaluationContext, StageResult};

use super::Judge;

/// Upper bound on a single judge evaluation.
pub const JUDGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs every judge concurrently and joins all results.
///
/// Each judge gets its own task bounded by [`JUDGE_TIMEOUT`]; a judge
/// that overruns yields a zero-score timeout result instead of blocking
/// the join. The runner never short-circuits on individual failures.
/// Dropping the returned future aborts all in-flight judge tasks.
pub struct JudgeRunner {
    judges: Vec<Arc<dyn Judge>>,
}

impl JudgeRunner {
    pub fn new(judges: Vec<Arc<dyn Judge>>) -> Self {
        Self { judges }
    }

    /// Fan out all judges, join, and collect results in arbitrary order.
    pub async fn run(&self, ctx: &EvaluationContext) -> Vec<StageResult> {
        let mut tasks = JoinSet::new();

        for judge in &self.judges {
            let judge = Arc::clone(judge);
            let ctx = ctx.clone();

            tasks.spawn(async move {
                let stage_name = format!("{}-judge", judge.name());

                match tokio::time::timeout(JUDGE_TIMEOUT, judge.evaluate(&ctx)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            judge = %stage_name,
                            timeout_s = JUDGE_TIMEOUT.as_secs(),
                            "judge evaluation timed out"
                        );
                        StageResult {
                            name: stage_name,
                            score: 0.0,
                            reason: format!(
                                "evaluation timed out after {}s",
                                JUDGE_TIMEOUT.as_secs()
                            ),
                            duration: JUDGE_TIMEOUT,
                        }
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(self.judges.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // Cancelled tasks simply drop out of the result set.
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    warn!(error = %e, "judge task failed to join");
                    results.push(StageResult::failed(
                        "unknown-judge",
                        format!("judge task failed: {e}"),
                        Duration::ZERO,
                    ));
                }
            }
        }

        debug!(judge_count = results.len(), "all judges completed");
        results
    }

    /// Number of judges in the set.
    pub fn len(&self) -> usize {
        self.judges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.judges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    #[derive(Debug)]
    struct ScriptedJudge {
        name: &'static str,
        score: f64,
        delay: Duration,
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        fn name(&self) -> &str {
            self.name
        }

        async fn evaluate(&self, _ctx: &EvaluationContext) -> StageResult {
            tokio::time::sleep(self.delay).await;
            StageResult {
                name: format!("{}-judge", self.name),
                score: self.score,
                reason: "scripted".to_string(),
                duration: self.delay,
            }
        }
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext::new("test", "q", "a", "")
    }

    #[tokio::test]
    async fn empty_set_returns_empty() {
        let runner = JudgeRunner::new(Vec::new());
        assert!(runner.run(&ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn all_judges_report() {
        let runner = JudgeRunner::new(vec![
            Arc::new(ScriptedJudge { name: "a", score: 0.1, delay: Duration::ZERO }) as Arc<dyn Judge>,
            Arc::new(ScriptedJudge { name: "b", score: 0.2, delay: Duration::ZERO }),
            Arc::new(ScriptedJudge { name: "c", score: 0.3, delay: Duration::ZERO }),
        ]);

        let mut results = runner.run(&ctx()).await;
        results.sort_by(|x, y| x.name.cmp(&y.name));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "a-judge");
        assert_eq!(results[2].name, "c-judge");
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_judge_times_out() {
        let runner = JudgeRunner::new(vec![
            Arc::new(ScriptedJudge { name: "fast", score: 0.9, delay: Duration::ZERO }) as Arc<dyn Judge>,
            Arc::new(ScriptedJudge {
                name: "slow",
                score: 0.9,
                delay: Duration::from_secs(20),
            }),
        ]);

        let results = runner.run(&ctx()).await;
        assert_eq!(results.len(), 2);

        let slow = results.iter().find(|r| r.name == "slow-judge").unwrap();
        assert_eq!(slow.score, 0.0);
        assert!(slow.reason.contains("timed out"));
        assert!(slow.duration >= JUDGE_TIMEOUT);

        let fast = results.iter().find(|r| r.name == "fast-judge").unwrap();
        assert_eq!(fast.score, 0.9);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_llm_call_times_out_at_the_runner() {
        use crate::config::{JudgeSpec, ModelConfig};
        use crate::judge::LlmJudge;
        use crate::llm::mock::MockLlmClient;

        let client = Arc::new(MockLlmClient::stalling(Duration::from_secs(20)));
        let spec = JudgeSpec {
            name: "relevance".to_string(),
            enabled: true,
            description: String::new(),
            requires_context: false,
            prompt: "{answer}".to_string(),
            model: None,
        };
        let model = ModelConfig { max_tokens: 256, temperature: 0.0, retry: false };
        let judge = LlmJudge::new(&spec, model, client).unwrap();

        let runner = JudgeRunner::new(vec![Arc::new(judge) as Arc<dyn Judge>]);
        let results = runner.run(&ctx()).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "relevance-judge");
        assert_eq!(results[0].score, 0.0);
        assert!(results[0].reason.contains("timed out"));
        assert!(results[0].duration >= JUDGE_TIMEOUT);
    }

    #[tokio::test]
    async fn one_failure_does_not_short_circuit() {
        #[derive(Debug)]
        struct FailingJudge;

        #[async_trait]
        impl Judge for FailingJudge {
            fn name(&self) -> &str {
                "broken"
            }

            async fn evaluate(&self, _ctx: &EvaluationContext) -> StageResult {
                StageResult::failed("broken-judge", "Failed to call LLM", Duration::ZERO)
            }
        }

        let runner = JudgeRunner::new(vec![
            Arc::new(FailingJudge) as Arc<dyn Judge>,
            Arc::new(ScriptedJudge { name: "fine", score: 0.8, delay: Duration::ZERO }),
        ]);

        let results = runner.run(&ctx()).await;
        assert_eq!(results.len(), 2);

        let ok = results.iter().find(|r| r.name == "fine-judge").unwrap();
        assert_eq!(ok.score, 0.8);
        let broken = results.iter().find(|r| r.name == "broken-judge").unwrap();
        assert_eq!(broken.score, 0.0);
    }
}
