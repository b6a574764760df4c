//! Fan-out/join over the checker bank.

use std::time::Duration;

use crate::types::{EvaluationContext, StageResult};

use super::Checker;

/// Runs every checker against the same context and joins the results.
///
/// Checkers are CPU-bound and fast, so they run on scoped OS threads
/// with no per-checker timeout. The runner never errors: a panicking
/// checker is recorded as a zero-score stage.
pub struct PrecheckRunner {
    checkers: Vec<Box<dyn Checker>>,
}

impl PrecheckRunner {
    pub fn new(checkers: Vec<Box<dyn Checker>>) -> Self {
        Self { checkers }
    }

    /// Fan out all checkers, join, and collect their results.
    ///
    /// Returns an empty list when the bank is empty. Result order is the
    /// runner's join order; callers must not rely on it.
    pub fn run(&self, ctx: &EvaluationContext) -> Vec<StageResult> {
        if self.checkers.is_empty() {
            return Vec::new();
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .checkers
                .iter()
                .map(|checker| scope.spawn(move || checker.check(ctx)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => StageResult::failed(
                        "precheck",
                        "checker panicked",
                        Duration::ZERO,
                    ),
                })
                .collect()
        })
    }

    /// Number of checkers in the bank.
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}
