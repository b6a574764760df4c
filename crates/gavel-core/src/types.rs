//! Core data model shared by every stage of the pipeline.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discrete outcome of an evaluation.
///
/// Serialized as the wire-stable strings `"pass"`, `"review"`, `"fail"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Review,
    Fail,
}

impl Verdict {
    /// The wire representation of this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Review => "review",
            Verdict::Fail => "fail",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised input to the engine.
///
/// Built once per request at the transport boundary and never mutated.
/// Transports are responsible for validation; the engine assumes
/// `query` and `answer` are non-empty while `context` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Unique event identifier, echoed back as `EvaluationResult::id`.
    pub request_id: String,

    /// The user's original query.
    #[serde(rename = "user_query")]
    pub query: String,

    /// Optional grounding context (retrieved documents etc.).
    #[serde(default)]
    pub context: String,

    /// The agent response under evaluation.
    pub answer: String,

    /// When the context was created.
    pub created_at: DateTime<Utc>,
}

impl EvaluationContext {
    /// Create a context stamped with the current time.
    pub fn new(
        request_id: impl Into<String>,
        query: impl Into<String>,
        answer: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            query: query.into(),
            context: context.into(),
            answer: answer.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether grounding context was provided.
    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }
}

/// One evaluator's verdict on a single context.
///
/// Evaluator failures are data, not errors: a failed run carries
/// `score: 0.0` and a `reason` naming the failure mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stable evaluator identifier (e.g. `"length-checker"`, `"relevance-judge"`).
    pub name: String,

    /// Score in `[0.0, 1.0]`.
    pub score: f64,

    /// Human-readable justification, or the failure mode.
    pub reason: String,

    /// Wall-clock time the evaluator spent, serialized as nanoseconds.
    #[serde(rename = "duration_ns", with = "duration_ns")]
    pub duration: Duration,
}

impl StageResult {
    /// A zero-score result recording a failure mode.
    pub fn failed(name: impl Into<String>, reason: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            score: 0.0,
            reason: reason.into(),
            duration,
        }
    }
}

/// Final output of an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Echoes `EvaluationContext::request_id`.
    pub id: String,

    /// Pre-check results first, then judge results, insertion order.
    pub stages: Vec<StageResult>,

    /// Weighted combination of stage means, in `[0.0, 1.0]`.
    pub confidence: f64,

    /// Discrete label derived from confidence.
    pub verdict: Verdict,
}

impl EvaluationResult {
    /// An empty failing result, used when a stage produced nothing to score.
    pub fn failed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stages: Vec::new(),
            confidence: 0.0,
            verdict: Verdict::Fail,
        }
    }
}

mod duration_ns {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_nanos().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
