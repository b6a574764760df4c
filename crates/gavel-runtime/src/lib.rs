//! # gavel-runtime
//!
//! LLM-assisted evaluation for gavel.
//!
//! This crate turns a validated judge configuration and an LLM client
//! into a two-stage evaluation pipeline: the deterministic pre-checks
//! from `gavel-core` run first, and only answers that survive them are
//! fanned out to concurrent LLM judges.
//!
//! ## Important
//!
//! All model traffic flows through the [`llm::LlmClient`] boundary.
//! Judges never talk to a provider directly, which is what makes the
//! whole engine testable against a scripted client.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gavel_core::EvaluationContext;
//! use gavel_runtime::{wire, AnthropicClient, JudgesConfig, Settings};
//!
//! let settings = Settings::from_env();
//! let client = Arc::new(AnthropicClient::from_env()?);
//! let engine = wire(&settings, &JudgesConfig::load()?, client)?;
//!
//! let ctx = EvaluationContext::new("req-1", query, answer, context);
//! let result = engine.pipeline.execute(&ctx).await;
//! println!("{} ({:.2})", result.verdict, result.confidence);
//! ```

pub mod config;
pub mod executor;
pub mod judge;
pub mod llm;
pub mod template;

pub use config::{
    ConfigError, JudgeSpec, JudgesConfig, ModelConfig, Settings, DEFAULT_EARLY_EXIT_THRESHOLD,
};
pub use executor::{
    wire, Engine, PipelineExecutor, PipelineExecutorBuilder, SingleJudgeExecutor,
    DEFAULT_SINGLE_JUDGE_THRESHOLD,
};
pub use judge::{Judge, JudgeFactory, JudgeNotFound, JudgePool, JudgeRunner, LlmJudge};
pub use llm::{
    AnthropicClient, Completion, CompletionRequest, LlmClient, LlmError, RetryPolicy,
};
pub use template::{PromptTemplate, TemplateError};
