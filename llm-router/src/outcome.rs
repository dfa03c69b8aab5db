use serde::Serialize;

/// Provenance kept when the primary backend failed and the fallback answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    /// Backend that was tried first and failed
    #[serde(rename = "fallback_from")]
    pub from: String,
    /// Why the primary failed (provider error text or timeout)
    #[serde(rename = "error_from_primary")]
    pub primary_error: String,
}

/// Result of routing one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingOutcome {
    #[serde(rename = "provider_used")]
    backend_used: String,
    #[serde(flatten)]
    fallback: Option<Fallback>,
    latency_ms: u64,
    answer: String,
}

impl RoutingOutcome {
    /// The first backend in the plan answered
    pub fn direct(backend_used: &str, answer: String, latency_ms: u64) -> Self {
        Self {
            backend_used: backend_used.to_string(),
            fallback: None,
            latency_ms,
            answer,
        }
    }

    /// The fallback answered after `from` failed with `primary_error`
    pub fn after_fallback(
        backend_used: &str,
        from: &str,
        primary_error: String,
        answer: String,
        latency_ms: u64,
    ) -> Self {
        Self {
            backend_used: backend_used.to_string(),
            fallback: Some(Fallback {
                from: from.to_string(),
                primary_error,
            }),
            latency_ms,
            answer,
        }
    }

    pub fn backend_used(&self) -> &str {
        &self.backend_used
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    pub fn fallback_from(&self) -> Option<&str> {
        self.fallback.as_ref().map(|f| f.from.as_str())
    }

    pub fn primary_error_message(&self) -> Option<&str> {
        self.fallback.as_ref().map(|f| f.primary_error.as_str())
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}
