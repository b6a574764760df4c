//! Surface-form check on the answer.

use std::time::Instant;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{EvaluationContext, StageResult};

use super::Checker;

lazy_static! {
    /// Three or more consecutive sentence-ending marks.
    static ref REPEATED_PUNCTUATION: Regex = Regex::new(r"[!?.]{3,}").unwrap();
}

/// Rejects empty or one-word answers and flags degenerate punctuation runs.
pub struct FormatChecker;

impl FormatChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FormatChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for FormatChecker {
    fn check(&self, ctx: &EvaluationContext) -> StageResult {
        let started = Instant::now();
        let answer = ctx.answer.trim();

        if answer.is_empty() {
            return StageResult::failed("format-checker", "Empty answer", started.elapsed());
        }

        if answer.split_whitespace().count() < 2 {
            return StageResult::failed("format-checker", "Short answer", started.elapsed());
        }

        if REPEATED_PUNCTUATION.is_match(answer) {
            return StageResult {
                name: "format-checker".to_string(),
                score: 0.5,
                reason: "Answer contains repeated punctuation".to_string(),
                duration: started.elapsed(),
            };
        }

        StageResult {
            name: "format-checker".to_string(),
            score: 1.0,
            reason: "Valid Answer".to_string(),
            duration: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(answer: &str) -> EvaluationContext {
        EvaluationContext::new("test", "query", answer, "")
    }

    #[test]
    fn empty_answer_scores_zero() {
        let result = FormatChecker::new().check(&ctx("   "));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "Empty answer");
    }

    #[test]
    fn one_word_answer_scores_zero() {
        let result = FormatChecker::new().check(&ctx("Yes."));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "Short answer");
    }

    #[test]
    fn three_repeated_marks_score_half() {
        let result = FormatChecker::new().check(&ctx("I am very sure!!!"));
        assert_eq!(result.score, 0.5);
        assert!(result.reason.contains("repeated punctuation"));

        // Mixed runs count too.
        let result = FormatChecker::new().check(&ctx("Really?! Are you sure?!."));
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn two_repeated_marks_are_fine() {
        let result = FormatChecker::new().check(&ctx("I am fairly sure!!"));
        assert_eq!(result.score, 1.0);
        assert_eq!(result.reason, "Valid Answer");
    }

    #[test]
    fn normal_answer_scores_one() {
        let result = FormatChecker::new().check(&ctx("Paris is the capital of France."));
        assert_eq!(result.score, 1.0);
        assert_eq!(result.name, "format-checker");
    }
}
