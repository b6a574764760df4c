//! # gavel-core
//!
//! Deterministic stages of the gavel evaluation pipeline.
//!
//! This crate holds everything that can be computed without a model:
//! the data model, the Stage-1 pre-check bank and its runner, the
//! score aggregator, and the offline validation statistics.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same input always produces same output
//! 2. **No LLM calls**: the adapter and judges live in `gavel-runtime`
//! 3. **Bounded scores**: every stage score and confidence is in `[0, 1]`
//! 4. **Parallel-safe**: checkers are pure and evaluate independently
//!
//! ## Example
//!
//! ```rust,ignore
//! use gavel_core::{Aggregator, EvaluationContext, PrecheckRunner, Weights};
//! use gavel_core::prechecks::default_checkers;
//!
//! let runner = PrecheckRunner::new(default_checkers(0.1));
//! let ctx = EvaluationContext::new("req-1", "What is Rust?", "A systems language.", "");
//! let stage1 = runner.run(&ctx);
//!
//! let aggregator = Aggregator::new(Weights::default());
//! let result = aggregator.aggregate(&ctx.request_id, stage1, judge_results);
//! println!("{} ({:.2})", result.verdict, result.confidence);
//! ```

pub mod aggregate;
pub mod prechecks;
pub mod types;
pub mod validation;

pub use aggregate::{Aggregator, Weights};
pub use prechecks::{Checker, FormatChecker, LengthChecker, OverlapChecker, PrecheckRunner};
pub use types::{EvaluationContext, EvaluationResult, StageResult, Verdict};
pub use validation::{
    validate_annotations, AnnotationPair, ValidationError, ValidationReport,
    DEFAULT_CORRELATION_THRESHOLD,
};
