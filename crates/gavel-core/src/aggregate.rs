//! Stage fan-in: weighted combination of stage means into a verdict.
//!
//! Aggregation is strict and deterministic: the same stage results and
//! the same weights always produce the same confidence and verdict.

use crate::types::{EvaluationResult, StageResult, Verdict};

/// Relative weight of each stage block in the final confidence.
///
/// Weights typically sum to 1.0 but are applied as given; they are not
/// normalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub prechecks: f64,
    pub llm_judge: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            prechecks: 0.3,
            llm_judge: 0.7,
        }
    }
}

/// Combines Stage-1 and Stage-2 results into an [`EvaluationResult`].
pub struct Aggregator {
    weights: Weights,
}

impl Aggregator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// Concatenate the stage blocks and derive confidence and verdict.
    ///
    /// If either block is empty the verdict is `fail` with confidence 0;
    /// the stages that did run are still reported.
    pub fn aggregate(
        &self,
        id: &str,
        stage1: Vec<StageResult>,
        stage2: Vec<StageResult>,
    ) -> EvaluationResult {
        if stage1.is_empty() || stage2.is_empty() {
            let mut stages = stage1;
            stages.extend(stage2);
            return EvaluationResult {
                id: id.to_string(),
                stages,
                confidence: 0.0,
                verdict: Verdict::Fail,
            };
        }

        let confidence =
            mean(&stage1) * self.weights.prechecks + mean(&stage2) * self.weights.llm_judge;

        let mut stages = stage1;
        stages.extend(stage2);

        EvaluationResult {
            id: id.to_string(),
            stages,
            confidence,
            verdict: verdict_for(confidence),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Weights::default())
    }
}

fn mean(stages: &[StageResult]) -> f64 {
    stages.iter().map(|s| s.score).sum::<f64>() / stages.len() as f64
}

/// Strict-greater on both boundaries: exactly 0.8 reviews, exactly 0.5 fails.
fn verdict_for(confidence: f64) -> Verdict {
    if confidence > 0.8 {
        Verdict::Pass
    } else if confidence > 0.5 {
        Verdict::Review
    } else {
        Verdict::Fail
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn stage(name: &str, score: f64) -> StageResult {
        StageResult {
            name: name.to_string(),
            score,
            reason: "ok".to_string(),
            duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn high_scores_pass() {
        let agg = Aggregator::default();
        // (0.8 * 0.3) + (0.9 * 0.7) = 0.87 > 0.8
        let result = agg.aggregate("test", vec![stage("precheck", 0.8)], vec![stage("judge", 0.9)]);
        assert_eq!(result.verdict, Verdict::Pass);
        assert!((result.confidence - 0.87).abs() < 1e-9);
    }

    #[test]
    fn middling_scores_review() {
        let agg = Aggregator::default();
        // (0.6 * 0.3) + (0.7 * 0.7) = 0.67
        let result = agg.aggregate("test", vec![stage("precheck", 0.6)], vec![stage("judge", 0.7)]);
        assert_eq!(result.verdict, Verdict::Review);
    }

    #[test]
    fn low_scores_fail() {
        let agg = Aggregator::default();
        // (0.2 * 0.3) + (0.4 * 0.7) = 0.34
        let result = agg.aggregate("test", vec![stage("precheck", 0.2)], vec![stage("judge", 0.4)]);
        assert_eq!(result.verdict, Verdict::Fail);
    }

    #[test]
    fn either_empty_block_fails() {
        let agg = Aggregator::default();

        let result = agg.aggregate("test", Vec::new(), vec![stage("judge", 1.0)]);
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.stages.len(), 1);

        let result = agg.aggregate("test", vec![stage("precheck", 1.0)], Vec::new());
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn boundaries_are_strict() {
        // Exactly 0.8 is review, exactly 0.5 is fail.
        assert_eq!(verdict_for(0.8), Verdict::Review);
        assert_eq!(verdict_for(0.5), Verdict::Fail);
        assert_eq!(verdict_for(0.8 + 1e-9), Verdict::Pass);
        assert_eq!(verdict_for(0.5 + 1e-9), Verdict::Review);
    }

    #[test]
    fn stage_order_is_preserved() {
        let agg = Aggregator::default();
        let result = agg.aggregate(
            "test",
            vec![stage("pre-a", 1.0), stage("pre-b", 1.0)],
            vec![stage("judge-a", 1.0)],
        );

        let names: Vec<_> = result.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["pre-a", "pre-b", "judge-a"]);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let agg = Aggregator::new(Weights { prechecks: 0.4, llm_judge: 0.6 });
        let a = agg.aggregate("test", vec![stage("p", 0.5)], vec![stage("j", 0.75)]);
        let b = agg.aggregate("test", vec![stage("p", 0.5)], vec![stage("j", 0.75)]);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.verdict, b.verdict);
    }
}
