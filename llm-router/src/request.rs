//! Inbound request validation
//!
//! Turns a raw JSON body into an immutable [`RoutingRequest`], or a
//! [`ValidationError`] naming the constraint that was broken.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub const MIN_MAX_TOKENS: u32 = 16;
pub const MAX_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Caller-selected preference deciding which backend(s) are tried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Free,
    Cheap,
    Best,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Free => "free",
            QualityTier::Cheap => "cheap",
            QualityTier::Best => "best",
        }
    }

    /// Parse a tier label, treating anything unrecognised as `free`
    pub fn from_label_lenient(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(QualityTier::Free),
            "cheap" => Ok(QualityTier::Cheap),
            "best" => Ok(QualityTier::Best),
            other => Err(ValidationError::new(format!(
                "quality must be one of free, cheap, best (got {:?})",
                other
            ))),
        }
    }
}

/// Raw `POST /route` body, before any constraint is checked.
///
/// A field may be left out to take its default, but an explicit `null` is a
/// type error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteRequestBody {
    #[serde(default, deserialize_with = "non_null")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub max_tokens: Option<i64>,
}

/// Only runs for fields present in the body; absent ones get `None` from `default`
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RouteRequestBody {
    pub fn validate(self) -> Result<RoutingRequest, ValidationError> {
        let prompt = self
            .prompt
            .ok_or_else(|| ValidationError::new("prompt is required"))?;

        let tier = match self.quality.as_deref() {
            Some(label) => label.parse::<QualityTier>()?,
            None => QualityTier::default(),
        };

        let max_tokens = match self.max_tokens {
            Some(n) => u32::try_from(n).map_err(|_| out_of_range(n))?,
            None => DEFAULT_MAX_TOKENS,
        };

        RoutingRequest::new(prompt, tier, max_tokens)
    }
}

fn out_of_range(n: impl fmt::Display) -> ValidationError {
    ValidationError::new(format!(
        "max_tokens must be between {} and {} (got {})",
        MIN_MAX_TOKENS, MAX_MAX_TOKENS, n
    ))
}

/// A validated routing request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRequest {
    prompt: String,
    tier: QualityTier,
    max_tokens: u32,
}

impl RoutingRequest {
    pub fn new(
        prompt: impl Into<String>,
        tier: QualityTier,
        max_tokens: u32,
    ) -> Result<Self, ValidationError> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(ValidationError::new("prompt must not be empty"));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&max_tokens) {
            return Err(out_of_range(max_tokens));
        }

        Ok(Self {
            prompt,
            tier,
            max_tokens,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
