//! Answer-to-query length ratio check.

use std::time::Instant;

use crate::types::{EvaluationContext, StageResult};

use super::Checker;

const MIN_RATIO: f64 = 0.5;
const MAX_RATIO: f64 = 10.0;

/// Scores an answer by its character length relative to the query.
///
/// Answers shorter than half the query score 0.0; answers more than ten
/// times longer score 0.5; everything in between scores 1.0.
pub struct LengthChecker;

impl LengthChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LengthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for LengthChecker {
    fn check(&self, ctx: &EvaluationContext) -> StageResult {
        let started = Instant::now();

        let query_len = ctx.query.chars().count();
        let answer_len = ctx.answer.chars().count();

        if query_len == 0 {
            return StageResult::failed("length-checker", "Empty query", started.elapsed());
        }

        let ratio = answer_len as f64 / query_len as f64;

        let (score, reason) = if ratio < MIN_RATIO {
            (0.0, "The answer is shorter than the query".to_string())
        } else if ratio > MAX_RATIO {
            (
                0.5,
                format!("The answer is excessively long: {ratio:.0} times the query length"),
            )
        } else {
            (1.0, "Answer length is acceptable".to_string())
        };

        StageResult {
            name: "length-checker".to_string(),
            score,
            reason,
            duration: started.elapsed(),
        }
    }
}
