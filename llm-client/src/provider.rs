use async_trait::async_trait;

use crate::error::Result;

/// Request to send to an LLM provider
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// A single-turn user prompt with a token budget and no system prompt
    pub fn single_turn(prompt: &str, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.to_string(),
            system_prompt: None,
            max_tokens: Some(max_tokens),
            temperature: None,
        }
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait for LLM providers
///
/// Anything implementing `complete` can act as a routing backend; callers that
/// only need the answer text use [`LlmProvider::generate`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a completion request
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Get the provider name for display
    fn name(&self) -> &str;

    /// Run a single-turn completion and return only the generated text.
    ///
    /// Carries no timeout of its own; callers bound the wait.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let response = self
            .complete(LlmRequest::single_turn(prompt, max_tokens))
            .await?;
        Ok(response.content)
    }
}
