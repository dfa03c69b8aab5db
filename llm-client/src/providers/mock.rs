//! Mock LLM provider for testing
//!
//! Provides a configurable mock provider that can simulate failures, slow
//! responses and successful responses, and records what it was asked.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider for testing routing and fallback behavior
pub struct MockProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: AtomicUsize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure (None = always succeed)
    fail_with: Mutex<Option<LlmError>>,
    /// Response content to return on success
    success_response: String,
    /// Time to wait before answering, success or failure
    delay: Option<Duration>,
    /// Most recent request received
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockProvider {
    fn build(fail_count: usize, error: Option<LlmError>, response: &str) -> Self {
        Self {
            fail_count: AtomicUsize::new(fail_count),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(error),
            success_response: response.to_string(),
            delay: None,
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: LlmError, response: &str) -> Self {
        Self::build(n, Some(error), response)
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: LlmError) -> Self {
        Self::build(usize::MAX, Some(error), "")
    }

    /// Create a provider that always succeeds
    pub fn always_succeeds(response: &str) -> Self {
        Self::build(0, None, response)
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The request most recently passed to complete(), if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Sleep for `delay` before every answer (useful for deadline tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let fail_count = self.fail_count.load(Ordering::SeqCst);

        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if call_num < fail_count {
            let error = self.fail_with.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(LlmResponse {
            content: self.success_response.clone(),
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Clone an LlmError (needed because LlmError doesn't implement Clone)
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::ServerOverloaded { message } => LlmError::ServerOverloaded {
            message: message.clone(),
        },
        LlmError::MissingApiKey { provider, env_var } => LlmError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        LlmError::RateLimited { retry_after } => LlmError::RateLimited {
            retry_after: *retry_after,
        },
        LlmError::ApiError {
            message,
            status_code,
        } => LlmError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        LlmError::ProviderUnavailable(s) => LlmError::ProviderUnavailable(s.clone()),
        LlmError::ConfigError(s) => LlmError::ConfigError(s.clone()),
        LlmError::InvalidPreset(s) => LlmError::InvalidPreset(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LlmRequest {
        LlmRequest::single_turn("test", 32)
    }

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");

        let result = provider.complete(request()).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(LlmError::ServerOverloaded {
            message: "overloaded".to_string(),
        });

        for _ in 0..3 {
            let result = provider.complete(request()).await;
            assert!(result.is_err());
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(
            2,
            LlmError::ServerOverloaded {
                message: "overloaded".to_string(),
            },
            "success",
        );

        // First two calls fail
        assert!(provider.complete(request()).await.is_err());
        assert!(provider.complete(request()).await.is_err());

        // Third call succeeds
        let result = provider.complete(request()).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_reproduced_on_every_call() {
        let provider = MockProvider::always_fails(LlmError::ApiError {
            message: "bad gateway".to_string(),
            status_code: Some(502),
        });

        for _ in 0..2 {
            match provider.complete(request()).await {
                Err(LlmError::ApiError {
                    message,
                    status_code,
                }) => {
                    assert_eq!(message, "bad gateway");
                    assert_eq!(status_code, Some(502));
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_records_prompt_and_budget() {
        let provider = MockProvider::always_succeeds("4");

        let answer = provider.generate("2+2?", 128).await.unwrap();
        assert_eq!(answer, "4");

        let seen = provider.last_request().unwrap();
        assert_eq!(seen.prompt, "2+2?");
        assert_eq!(seen.max_tokens, Some(128));
        assert!(seen.system_prompt.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_observed() {
        let provider = MockProvider::always_succeeds("slow").with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        provider.generate("hi", 16).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
