//! Keyword overlap check between query and answer.

use std::collections::HashSet;
use std::time::Instant;

use lazy_static::lazy_static;

use crate::types::{EvaluationContext, StageResult};

use super::Checker;

/// Default cut-off below which overlap is reported as low.
pub const DEFAULT_MIN_OVERLAP_THRESHOLD: f64 = 0.1;

const PUNCTUATION: &str = ".,!?;:()[]{}\"'";

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "of", "at", "by", "for", "with",
        "about", "against", "between", "into", "through", "during", "before", "after", "to",
        "from", "in", "on",
    ]
    .into_iter()
    .collect();
}

/// Scores an answer by the share of unique query keywords it repeats.
///
/// Both strings are lowercased, stripped of ASCII punctuation, and
/// filtered of stop words and single-character tokens. The score is the
/// raw ratio `|unique_query ∩ unique_answer| / |unique_query|`; the
/// threshold only selects the reason wording.
pub struct OverlapChecker {
    min_overlap_threshold: f64,
}

impl OverlapChecker {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_MIN_OVERLAP_THRESHOLD)
    }

    pub fn with_threshold(min_overlap_threshold: f64) -> Self {
        Self {
            min_overlap_threshold,
        }
    }
}

impl Default for OverlapChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for OverlapChecker {
    fn check(&self, ctx: &EvaluationContext) -> StageResult {
        let started = Instant::now();

        if ctx.query.is_empty() {
            return StageResult::failed("overlap-checker", "Empty query", started.elapsed());
        }
        if ctx.answer.is_empty() {
            return StageResult::failed("overlap-checker", "Empty answer", started.elapsed());
        }

        let query_tokens = tokenize(&ctx.query);
        let answer_tokens = tokenize(&ctx.answer);

        if query_tokens.is_empty() {
            return StageResult::failed(
                "overlap-checker",
                "No scorable keywords in query",
                started.elapsed(),
            );
        }

        let shared = query_tokens.intersection(&answer_tokens).count();
        let score = shared as f64 / query_tokens.len() as f64;

        let reason = if score < self.min_overlap_threshold {
            format!(
                "Low keyword overlap: {:.0}% of query terms found in answer",
                score * 100.0
            )
        } else {
            "There is a good overlap".to_string()
        };

        StageResult {
            name: "overlap-checker".to_string(),
            score,
            reason,
            duration: started.elapsed(),
        }
    }
}

/// Lowercase, strip punctuation, drop stop words and one-character tokens.
fn tokenize(s: &str) -> HashSet<String> {
    let lowered = s.to_lowercase();
    let stripped: String = lowered.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();

    stripped
        .split_whitespace()
        .filter(|word| word.len() > 1 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}
