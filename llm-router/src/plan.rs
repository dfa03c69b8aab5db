//! Plan selection: which backends a tier tries, and in what order.

use std::fmt;

use serde::Serialize;

use crate::request::QualityTier;

/// The two backend slots a router is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendRole {
    /// Fast, low-cost provider
    Fast,
    /// Higher-quality, higher-cost provider
    Quality,
}

impl BackendRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendRole::Fast => "fast",
            BackendRole::Quality => "quality",
        }
    }
}

impl fmt::Display for BackendRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered plan of one or two backends. At most one fallback hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendPlan {
    primary: BackendRole,
    fallback: Option<BackendRole>,
}

impl BackendPlan {
    /// `best` and `cheap` are single-shot; only `free` pays for a fallback.
    pub fn for_tier(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Best => Self {
                primary: BackendRole::Quality,
                fallback: None,
            },
            QualityTier::Cheap => Self {
                primary: BackendRole::Fast,
                fallback: None,
            },
            QualityTier::Free => Self {
                primary: BackendRole::Fast,
                fallback: Some(BackendRole::Quality),
            },
        }
    }

    pub fn primary(&self) -> BackendRole {
        self.primary
    }

    pub fn fallback(&self) -> Option<BackendRole> {
        self.fallback
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.fallback.is_some())
    }

    pub fn roles(&self) -> Vec<BackendRole> {
        std::iter::once(self.primary).chain(self.fallback).collect()
    }
}

impl fmt::Display for BackendPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fallback {
            Some(fallback) => write!(f, "{} -> {}", self.primary, fallback),
            None => write!(f, "{}", self.primary),
        }
    }
}
