//! LLM provider implementations

pub mod mock;
mod openai_compatible;

pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    OpenAI,
    OpenRouter,
    Cerebras,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" | "open-ai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "cerebras" => Ok(Self::Cerebras),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Cerebras => "CEREBRAS_API_KEY",
        }
    }

    /// Human-readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::OpenAI => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::Cerebras => "Cerebras",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind = ProviderKind::parse(&preset.provider)?;
    let api_key = get_api_key(provider_config, kind.env_var(), kind.display_name())?;

    let mut provider = match kind {
        ProviderKind::Groq => OpenAICompatibleProvider::groq(&preset.model, api_key)?,
        ProviderKind::OpenAI => OpenAICompatibleProvider::openai(&preset.model, api_key)?,
        ProviderKind::OpenRouter => OpenAICompatibleProvider::openrouter(&preset.model, api_key)?,
        ProviderKind::Cerebras => OpenAICompatibleProvider::cerebras(&preset.model, api_key)?,
    };

    if let Some(base_url) = provider_config.and_then(|c| c.base_url.as_deref()) {
        provider = provider.with_base_url(base_url);
    }
    if let Some(temperature) = preset.temperature {
        provider = provider.with_temperature(temperature);
    }

    log::debug!(
        "Initialized {} provider (model: {}, endpoint: {})",
        kind.display_name(),
        preset.model,
        provider.base_url()
    );

    Ok(Box::new(provider))
}

/// Get API key from config or environment variable
fn get_api_key(
    config: Option<&ProviderConfig>,
    env_var: &str,
    provider_name: &str,
) -> Result<String> {
    // Check config first
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(env_var).map_err(|_| LlmError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: env_var.to_string(),
    })
}
