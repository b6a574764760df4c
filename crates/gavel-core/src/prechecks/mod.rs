//! Stage-1: deterministic pre-checks.
//!
//! Pre-checks are cheap, pure functions over an [`EvaluationContext`].
//! They never call an LLM, never suspend, and never fail the request:
//! every checker returns a [`StageResult`] with a score in `[0.0, 1.0]`.

mod format;
mod length;
mod overlap;
mod runner;

pub use format::FormatChecker;
pub use length::LengthChecker;
pub use overlap::{OverlapChecker, DEFAULT_MIN_OVERLAP_THRESHOLD};
pub use runner::PrecheckRunner;

use crate::types::{EvaluationContext, StageResult};

/// A deterministic checker over `(query, answer, context)`.
///
/// Implementations must be side-effect-free and safe to call from
/// multiple threads at once.
pub trait Checker: Send + Sync {
    fn check(&self, ctx: &EvaluationContext) -> StageResult;
}

/// The canonical checker bank: length, overlap, format.
pub fn default_checkers(min_overlap_threshold: f64) -> Vec<Box<dyn Checker>> {
    vec![
        Box::new(LengthChecker::new()),
        Box::new(OverlapChecker::with_threshold(min_overlap_threshold)),
        Box::new(FormatChecker::new()),
    ]
}
