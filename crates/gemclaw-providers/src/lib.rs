//! # GemClaw Providers
//!
//! LLM provider implementations for GemClaw.
//!
//! OpenAI, Groq, Ollama and any `custom:<url>` endpoint are handled by a
//! single `OpenAiCompatibleProvider`, which serves both chat completions and
//! embeddings. `HashingEmbedder` is the offline embedder for tests and
//! air-gapped runs.

pub mod hashing;
pub mod openai_compatible;
pub mod provider_registry;

use std::sync::Arc;

use gemclaw_core::config::GemClawConfig;
use gemclaw_core::error::{GemClawError, Result};
use gemclaw_core::traits::{Embedder, Provider};
use gemclaw_core::types::ModelInfo;

use openai_compatible::OpenAiCompatibleProvider;

/// Create the chat provider from configuration.
pub fn create_provider(config: &GemClawConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(resolve(config.provider_name(), config)?))
}

/// Create the embedder from the `[embedding]` section.
///
/// `"local"` (or `"none"`) selects the offline hashing embedder.
pub fn create_embedder(config: &GemClawConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedding.provider.as_str() {
        "local" | "none" => Ok(Arc::new(hashing::HashingEmbedder::new(
            config.embedding.local_dimensions,
        ))),
        name => Ok(Arc::new(resolve(name, config)?)),
    }
}

fn resolve(provider_name: &str, config: &GemClawConfig) -> Result<OpenAiCompatibleProvider> {
    if let Some(endpoint) = provider_name.strip_prefix("custom:") {
        return OpenAiCompatibleProvider::custom(endpoint, config);
    }
    let backend = provider_registry::lookup(provider_name)
        .ok_or_else(|| GemClawError::ProviderNotFound(provider_name.into()))?;
    OpenAiCompatibleProvider::for_backend(backend, config)
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::names();
    names.push("custom");
    names
}

/// Chat models registered for `provider_name` (empty for unknown or custom).
pub fn known_models(provider_name: &str) -> Vec<ModelInfo> {
    provider_registry::lookup(provider_name)
        .map(|b| b.models.iter().map(|m| m.to_model_info(b.name)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let mut config = GemClawConfig::default();
        config.default_provider = "nope".into();
        assert!(matches!(
            create_provider(&config),
            Err(GemClawError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_local_embedder_selected() {
        let mut config = GemClawConfig::default();
        config.embedding.provider = "local".into();
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.name(), "local");
    }

    #[test]
    fn test_custom_provider() {
        let mut config = GemClawConfig::default();
        config.default_provider = "custom:http://localhost:5000/v1/".into();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "custom");
    }

    #[test]
    fn test_available_providers() {
        let names = available_providers();
        assert!(names.contains(&"openai"));
        assert!(names.contains(&"ollama"));
        assert!(names.contains(&"custom"));
    }

    #[test]
    fn test_known_models() {
        let models = known_models("openai");
        assert!(models.iter().any(|m| m.id == "gpt-4o-mini"));
        assert!(models.iter().all(|m| m.provider == "openai"));
        assert!(known_models("custom:http://x").is_empty());
    }
}
