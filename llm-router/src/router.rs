//! Deadline-bounded routing with a single fallback hop

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use llm_client::LlmProvider;
use log::{debug, error, info, warn};
use tokio::time::Instant;

use crate::error::{BackendError, RouteError};
use crate::outcome::RoutingOutcome;
use crate::plan::{BackendPlan, BackendRole};
use crate::request::RoutingRequest;

pub const FAST_DEADLINE: Duration = Duration::from_secs(12);
pub const QUALITY_DEADLINE: Duration = Duration::from_secs(20);

/// A provider bound to the identifier it is reported under and its deadline
#[derive(Clone)]
pub struct Backend {
    id: String,
    provider: Arc<dyn LlmProvider>,
    deadline: Duration,
}

impl Backend {
    pub fn new(id: impl Into<String>, provider: Arc<dyn LlmProvider>, deadline: Duration) -> Self {
        Self {
            id: id.into(),
            provider,
            deadline,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Race one generate call against the deadline.
    ///
    /// On timeout the call future is dropped, so its result is never observed.
    async fn attempt(&self, prompt: &str, max_tokens: u32) -> Result<String, BackendError> {
        match tokio::time::timeout(self.deadline, self.provider.generate(prompt, max_tokens)).await
        {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(err)) => Err(BackendError::provider(&self.id, err)),
            Err(_) => Err(BackendError::timeout(&self.id, self.deadline)),
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("id", &self.id)
            .field("provider", &self.provider.name())
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Routes prompts across a fast and a high-quality backend.
///
/// Holds no per-request state; one instance serves concurrent calls.
#[derive(Debug, Clone)]
pub struct PromptRouter {
    fast: Backend,
    quality: Backend,
}

impl PromptRouter {
    pub fn new(fast: Backend, quality: Backend) -> Self {
        Self { fast, quality }
    }

    pub fn backend(&self, role: BackendRole) -> &Backend {
        match role {
            BackendRole::Fast => &self.fast,
            BackendRole::Quality => &self.quality,
        }
    }

    /// Route one validated request.
    ///
    /// Tries the plan's primary under its deadline and, if the plan has one,
    /// the fallback under its own. Prompt and token budget are passed through
    /// unchanged to whichever backend runs.
    pub async fn route(&self, request: &RoutingRequest) -> Result<RoutingOutcome, RouteError> {
        let started = Instant::now();
        let plan = BackendPlan::for_tier(request.tier());
        let primary = self.backend(plan.primary());

        debug!(
            "tier={} plan=[{}] max_tokens={}",
            request.tier(),
            plan,
            request.max_tokens()
        );

        let primary_error = match primary
            .attempt(request.prompt(), request.max_tokens())
            .await
        {
            Ok(answer) => {
                let outcome = RoutingOutcome::direct(primary.id(), answer, elapsed_ms(started));
                info!(
                    "routed via {} in {}ms",
                    outcome.backend_used(),
                    outcome.latency_ms()
                );
                return Ok(outcome);
            }
            Err(err) => err,
        };

        let Some(fallback_role) = plan.fallback() else {
            error!("{} failed with no fallback: {}", primary.id(), primary_error);
            return Err(RouteError::Backend(primary_error));
        };
        let fallback = self.backend(fallback_role);

        warn!(
            "{} failed ({}), falling back to {}",
            primary.id(),
            primary_error,
            fallback.id()
        );

        match fallback
            .attempt(request.prompt(), request.max_tokens())
            .await
        {
            Ok(answer) => {
                let outcome = RoutingOutcome::after_fallback(
                    fallback.id(),
                    primary.id(),
                    primary_error.to_string(),
                    answer,
                    elapsed_ms(started),
                );
                info!(
                    "routed via {} (fallback from {}) in {}ms",
                    outcome.backend_used(),
                    primary.id(),
                    outcome.latency_ms()
                );
                Ok(outcome)
            }
            Err(fallback_error) => {
                error!(
                    "{} failed after fallback: {}",
                    fallback.id(),
                    fallback_error
                );
                Err(RouteError::RoutingFailure {
                    primary: primary_error,
                    fallback: fallback_error,
                })
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
