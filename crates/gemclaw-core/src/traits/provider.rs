//! Provider trait — chat completion backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ProviderResponse};

/// Sampling parameters for one completion call.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }
}

impl GenerateParams {
    pub fn from_config(config: &crate::config::GemClawConfig) -> Self {
        Self {
            model: config.model_name().to_string(),
            temperature: config.default_temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Run a chat completion.
    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<ProviderResponse>;

    /// Single-prompt completion returning plain text.
    ///
    /// The prompt goes out as one user message; a missing content field is
    /// treated as an empty answer.
    async fn complete(&self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let response = self.chat(&[Message::user(prompt)], params).await?;
        Ok(response.content.unwrap_or_default())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
