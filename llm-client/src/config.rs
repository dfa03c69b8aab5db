use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LlmError, Result};

/// Preset and provider tables shared by every program that talks to an LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Named model presets for quick access
    #[serde(default = "default_presets")]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// A named model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (groq, openai, openrouter, cerebras)
    pub provider: String,

    /// Model name/identifier for the provider
    pub model: String,

    /// Sampling temperature; the provider default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL (for API providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_presets() -> HashMap<String, ModelPreset> {
    let mut presets = HashMap::new();

    presets.insert(
        "groq".to_string(),
        ModelPreset {
            provider: "groq".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: None,
        },
    );
    presets.insert(
        "openai".to_string(),
        ModelPreset {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: None,
        },
    );

    presets
}

impl Config {
    /// Get a preset by name
    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// Get provider config by provider name
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            providers: HashMap::new(),
        }
    }
}
