//! LLM adapter boundary.
//!
//! The engine depends only on [`LlmClient`]; concrete providers plug in
//! behind it. The adapter returns raw completion text and never parses
//! judge JSON — that is the judge's job.

mod anthropic;

pub use anthropic::AnthropicClient;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("client not configured: {0}")]
    NotConfigured(String),

    #[error("{attempts} attempts exhausted: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<LlmError>,
    },
}

impl LlmError {
    /// Whether another attempt may succeed.
    ///
    /// Throttling, transient server faults, timeouts, and broken
    /// connections are retryable; client errors, parse failures, and
    /// configuration problems are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Http(message) => {
                let message = message.to_lowercase();
                message.contains("connection reset")
                    || message.contains("broken pipe")
                    || message.contains("unexpected eof")
                    || message.contains("timed out")
            }
            _ => false,
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// A single completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw text of the first completion block.
    pub content: String,

    /// Why generation stopped, if the provider reported it.
    pub stop_reason: Option<String>,
}

/// Uniform request/response interface to a text model.
///
/// Implementations must be `Send + Sync`; the judge runner invokes one
/// shared client from many tasks at once.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One model call.
    async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;

    /// Same contract as [`invoke`](Self::invoke), transparently retrying
    /// retryable failures per the client's [`RetryPolicy`].
    async fn invoke_with_retry(&self, request: &CompletionRequest)
        -> Result<Completion, LlmError>;
}

/// Exponential backoff schedule with uniform jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(12),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `k` (0-indexed, `k >= 1`):
    /// `min(max_delay, initial_delay + 2^k seconds)` perturbed by a
    /// uniform ±20% jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        use rand::Rng;

        let exponential = Duration::from_secs(1u64 << attempt.min(32));
        let capped = (self.initial_delay + exponential).min(self.max_delay);

        let jitter: f64 = rand::thread_rng().gen_range(-0.2..=0.2);
        capped.mul_f64(1.0 + jitter)
    }

    /// Drive `op` until it succeeds, exhausts `max_attempts`, or fails
    /// terminally. Dropping the returned future cancels the in-flight
    /// attempt and any backoff sleep.
    pub async fn run<F, Fut>(&self, mut op: F) -> Result<Completion, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Completion, LlmError>>,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(completion) => return Ok(completion),
                Err(error) if error.is_retryable() => {
                    warn!(attempt, error = %error, "retryable LLM failure");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| LlmError::NotConfigured("no attempts made".into())),
            ),
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{Completion, CompletionRequest, LlmClient, LlmError};

    /// Scripted client for judge and executor tests.
    #[derive(Default)]
    pub struct MockLlmClient {
        /// Content returned on success.
        pub content: String,
        /// When true, every call fails with a terminal API error.
        pub fail: bool,
        /// Sleep applied before answering (drives timeout tests).
        pub delay: Option<Duration>,
        pub invoke_calls: AtomicUsize,
        pub retry_calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockLlmClient {
        pub fn returning(content: impl Into<String>) -> Self {
            Self {
                content: content.into(),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn stalling(delay: Duration) -> Self {
            Self {
                content: r#"{"score": 1.0, "reason": "too late"}"#.to_string(),
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn total_calls(&self) -> usize {
            self.invoke_calls.load(Ordering::SeqCst) + self.retry_calls.load(Ordering::SeqCst)
        }

        async fn respond(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(LlmError::Api {
                    status: 400,
                    message: "scripted failure".to_string(),
                });
            }
            Ok(Completion {
                content: self.content.clone(),
                stop_reason: Some("end_turn".to_string()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
            self.invoke_calls.fetch_add(1, Ordering::SeqCst);
            self.respond(request).await
        }

        async fn invoke_with_retry(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, LlmError> {
            self.retry_calls.fetch_add(1, Ordering::SeqCst);
            self.respond(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn rate_limits_and_server_faults_are_retryable() {
        assert!(LlmError::RateLimited { retry_after: None }.is_retryable());
        assert!(LlmError::Api { status: 500, message: "boom".into() }.is_retryable());
        assert!(LlmError::Api { status: 503, message: "busy".into() }.is_retryable());
        assert!(LlmError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(LlmError::Http("connection reset by peer".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_terminal() {
        assert!(!LlmError::Api { status: 400, message: "bad".into() }.is_retryable());
        assert!(!LlmError::Api { status: 404, message: "missing".into() }.is_retryable());
        assert!(!LlmError::Parse("garbage".into()).is_retryable());
        assert!(!LlmError::NotConfigured("no key".into()).is_retryable());
    }

    #[test]
    fn backoff_grows_and_stays_within_jitter_bounds() {
        let policy = RetryPolicy::default();

        // initial + 2^1 = 2.1s, ±20%
        let first = policy.backoff(1);
        assert!(first >= Duration::from_millis(1670), "{first:?}");
        assert!(first <= Duration::from_millis(2530), "{first:?}");

        // initial + 2^2 = 4.1s, ±20%
        let second = policy.backoff(2);
        assert!(second >= Duration::from_millis(3270), "{second:?}");
        assert!(second <= Duration::from_millis(4930), "{second:?}");
    }

    #[test]
    fn backoff_is_capped_at_max_delay() {
        let policy = RetryPolicy::default();

        // initial + 2^10 far exceeds the 12s cap; jitter may add 20%.
        let capped = policy.backoff(10);
        assert!(capped <= Duration::from_millis(14_410), "{capped:?}");
        assert!(capped >= Duration::from_millis(9_590), "{capped:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn run_retries_until_success() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                let attempt = calls.get();
                calls.set(attempt + 1);
                async move {
                    if attempt < 2 {
                        Err(LlmError::Api { status: 500, message: "flaky".into() })
                    } else {
                        Ok(Completion { content: "ok".into(), stop_reason: None })
                    }
                }
            })
            .await;

        assert_eq!(calls.get(), 3);
        assert_eq!(result.unwrap().content, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn run_aborts_on_terminal_error() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(LlmError::Api { status: 400, message: "bad request".into() }) }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn run_reports_exhaustion() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(LlmError::RateLimited { retry_after: None }) }
            })
            .await;

        assert_eq!(calls.get(), 3);
        match result {
            Err(LlmError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, LlmError::RateLimited { .. }));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }
}
