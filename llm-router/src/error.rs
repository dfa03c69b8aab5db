use std::fmt;
use std::time::Duration;

use llm_client::LlmError;
use thiserror::Error;

/// An inbound request broke one of its constraints; rejected before routing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why a single backend invocation failed
#[derive(Error, Debug)]
pub enum BackendErrorKind {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error("timeout after {}", HumanDuration(*deadline))]
    Timeout { deadline: Duration },
}

/// One backend invocation failed, either at the provider or on its deadline.
///
/// Displays as the underlying reason only; the backend id is carried alongside.
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct BackendError {
    pub backend: String,
    pub kind: BackendErrorKind,
}

impl BackendError {
    pub fn provider(backend: &str, error: LlmError) -> Self {
        Self {
            backend: backend.to_string(),
            kind: BackendErrorKind::Provider(error),
        }
    }

    pub fn timeout(backend: &str, deadline: Duration) -> Self {
        Self {
            backend: backend.to_string(),
            kind: BackendErrorKind::Timeout { deadline },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, BackendErrorKind::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The plan had a single step and it failed
    #[error("Backend {} failed: {}", .0.backend, .0)]
    Backend(BackendError),

    /// The primary failed and so did the fallback
    #[error(
        "All backends failed: {} ({}), then {} ({})",
        primary.backend,
        primary,
        fallback.backend,
        fallback
    )]
    RoutingFailure {
        primary: BackendError,
        fallback: BackendError,
    },
}

impl RouteError {
    /// True when the last backend tried ran out of time rather than erroring
    pub fn is_timeout(&self) -> bool {
        match self {
            RouteError::Validation(_) => false,
            RouteError::Backend(err) => err.is_timeout(),
            RouteError::RoutingFailure { fallback, .. } => fallback.is_timeout(),
        }
    }
}

struct HumanDuration(Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.subsec_nanos() == 0 {
            write!(f, "{}s", self.0.as_secs())
        } else {
            write!(f, "{}ms", self.0.as_millis())
        }
    }
}
