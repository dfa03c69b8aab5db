//! LLM provider adapters for the llm-router workspace
//!
//! Provides a unified interface for multiple LLM providers, all speaking the
//! OpenAI chat completions dialect:
//! - Groq (fast, low-cost Llama inference)
//! - OpenAI (higher quality)
//! - OpenRouter (multi-model access)
//! - Cerebras (fast Llama inference)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, OpenAICompatibleProvider, ProviderKind, get_provider};
