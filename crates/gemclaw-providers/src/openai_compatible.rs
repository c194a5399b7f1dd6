//! Client for OpenAI-compatible chat and embedding endpoints.

use async_trait::async_trait;
use gemclaw_core::config::GemClawConfig;
use gemclaw_core::error::{GemClawError, Result};
use gemclaw_core::traits::embedder::Embedder;
use gemclaw_core::traits::provider::{GenerateParams, Provider};
use gemclaw_core::types::{Message, ProviderResponse, Usage};
use serde_json::{Value, json};

use crate::provider_registry::Backend;

const CHAT_PATH: &str = "/chat/completions";
const EMBEDDINGS_PATH: &str = "/embeddings";

pub struct OpenAiCompatibleProvider {
    name: String,
    /// Base URL including the version prefix, without a trailing slash.
    base_url: String,
    api_key: String,
    /// Local servers accept requests without a key.
    key_required: bool,
    serves_embeddings: bool,
    embedding_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Client for a registered backend.
    ///
    /// The key comes from `[llm] api_key`, then the top-level `api_key`, then
    /// the backend's env var. The URL comes from `[llm] endpoint`, then the
    /// backend's host env var, then its default.
    pub fn for_backend(backend: &Backend, config: &GemClawConfig) -> Result<Self> {
        let api_key = configured_key(config)
            .or_else(|| backend.key_env.and_then(|var| std::env::var(var).ok()))
            .unwrap_or_default();

        let base_url = if !config.llm.endpoint.is_empty() {
            config.llm.endpoint.trim_end_matches('/').to_string()
        } else if let Some(host) = backend.host_env.and_then(|var| std::env::var(var).ok()) {
            with_version_prefix(&host)
        } else {
            backend.base_url.to_string()
        };

        Ok(Self {
            name: backend.name.to_string(),
            base_url,
            api_key,
            key_required: backend.key_env.is_some(),
            serves_embeddings: backend.serves_embeddings,
            embedding_model: config.embedding.model.clone(),
            client: build_client(config.llm.request_timeout_secs)?,
        })
    }

    /// Client for an arbitrary endpoint given as `custom:<base-url>`. A key is
    /// sent only when one is configured or `CUSTOM_API_KEY` is set.
    pub fn custom(base_url: &str, config: &GemClawConfig) -> Result<Self> {
        let api_key = configured_key(config)
            .or_else(|| std::env::var("CUSTOM_API_KEY").ok())
            .unwrap_or_default();

        Ok(Self {
            name: "custom".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            key_required: false,
            serves_embeddings: true,
            embedding_model: config.embedding.model.clone(),
            client: build_client(config.llm.request_timeout_secs)?,
        })
    }

    fn ensure_key(&self) -> Result<()> {
        if self.key_required && self.api_key.is_empty() {
            return Err(GemClawError::ApiKeyMissing(self.name.clone()));
        }
        Ok(())
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.client.post(&url).json(body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| GemClawError::Http(format!("{} unreachable at {url}: {e}", self.name)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GemClawError::Provider(format!("{} returned {status}: {text}", self.name)));
        }

        resp.json()
            .await
            .map_err(|e| GemClawError::Http(format!("{} sent an unreadable body: {e}", self.name)))
    }
}

fn configured_key(config: &GemClawConfig) -> Option<String> {
    [&config.llm.api_key, &config.api_key]
        .into_iter()
        .find(|k| !k.is_empty())
        .cloned()
}

/// `OLLAMA_HOST`-style values usually omit the `/v1` prefix.
fn with_version_prefix(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.ends_with("/v1") {
        host.to_string()
    } else {
        format!("{host}/v1")
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GemClawError::Http(format!("HTTP client error: {e}")))
}

/// Parse a `/chat/completions` response body.
pub fn parse_chat_response(json: &Value) -> Result<ProviderResponse> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| GemClawError::Provider("No choices in response".into()))?;

    let content = choice["message"]["content"].as_str().map(String::from);

    let usage = json["usage"].as_object().map(|u| Usage {
        prompt_tokens: u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        completion_tokens: u
            .get("completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
        total_tokens: u.get("total_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
    });

    Ok(ProviderResponse {
        content,
        finish_reason: choice["finish_reason"].as_str().map(String::from),
        usage,
    })
}

/// Parse an `/embeddings` response body into vectors ordered by `index`.
pub fn parse_embeddings_response(json: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let data = json["data"]
        .as_array()
        .ok_or_else(|| GemClawError::Embedding("No data in embeddings response".into()))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(pos);
        let vector = item["embedding"]
            .as_array()
            .ok_or_else(|| GemClawError::Embedding(format!("Item {index} has no embedding")))?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| GemClawError::Embedding(format!("Item {index} has non-numeric values")))?;
        indexed.push((index, vector));
    }
    indexed.sort_by_key(|(i, _)| *i);

    if indexed.len() != expected {
        return Err(GemClawError::Embedding(format!(
            "Expected {expected} embeddings, got {}",
            indexed.len()
        )));
    }
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<ProviderResponse> {
        self.ensure_key()?;

        let body = json!({
            "model": params.model,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "messages": messages,
        });

        tracing::debug!("→ {} chat ({} messages, model {})", self.name, messages.len(), params.model);
        let json = self.post_json(CHAT_PATH, &body).await?;
        parse_chat_response(&json)
    }

    /// Hosted backends count as ready when a key is present; local ones
    /// must answer `GET /models`.
    async fn health_check(&self) -> Result<bool> {
        if self.key_required {
            return Ok(!self.api_key.is_empty());
        }
        let resp = self.client.get(format!("{}/models", self.base_url)).send().await;
        Ok(resp.is_ok_and(|r| r.status().is_success()))
    }
}

#[async_trait]
impl Embedder for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_key()?;
        if !self.serves_embeddings {
            return Err(GemClawError::Embedding(format!(
                "{} does not serve embeddings",
                self.name
            )));
        }

        let body = json!({
            "model": self.embedding_model,
            "input": texts,
        });

        tracing::debug!("→ {} embeddings ({} inputs)", self.name, texts.len());
        let json = self.post_json(EMBEDDINGS_PATH, &body).await?;
        parse_embeddings_response(&json, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider_registry::lookup;

    #[test]
    fn test_parse_chat_response() {
        let body = json!({
            "choices": [{
                "message": { "role": "assistant", "content": "SELECT COUNT(*) FROM inventory" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128 }
        });
        let resp = parse_chat_response(&body).unwrap();
        assert_eq!(resp.content.as_deref(), Some("SELECT COUNT(*) FROM inventory"));
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 128);
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        let err = parse_chat_response(&json!({ "choices": [] })).unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }

    #[test]
    fn test_parse_embeddings_reorders_by_index() {
        let body = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_embeddings_response(&body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_embeddings_count_mismatch() {
        let body = json!({ "data": [{ "index": 0, "embedding": [1.0] }] });
        assert!(parse_embeddings_response(&body, 3).is_err());
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = GemClawConfig::default();
        config.llm.endpoint = "http://10.0.0.5:9000/v1/".into();
        config.llm.api_key = "sk-test".into();
        let provider = OpenAiCompatibleProvider::for_backend(lookup("openai").unwrap(), &config).unwrap();
        assert_eq!(provider.base_url, "http://10.0.0.5:9000/v1");
        assert_eq!(provider.api_key, "sk-test");
    }

    #[test]
    fn test_host_gets_version_prefix() {
        assert_eq!(with_version_prefix("http://gpu-box:11434"), "http://gpu-box:11434/v1");
        assert_eq!(with_version_prefix("http://gpu-box:11434/v1/"), "http://gpu-box:11434/v1");
    }

    #[test]
    fn test_custom_endpoint_needs_no_key() {
        let config = GemClawConfig::default();
        let provider = OpenAiCompatibleProvider::custom("http://localhost:5000/v1/", &config).unwrap();
        assert_eq!(provider.base_url, "http://localhost:5000/v1");
        assert!(!provider.key_required);
        assert!(provider.ensure_key().is_ok());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let mut config = GemClawConfig::default();
        config.llm.endpoint = "http://127.0.0.1:9".into();
        let mut provider = OpenAiCompatibleProvider::for_backend(lookup("groq").unwrap(), &config).unwrap();
        provider.api_key.clear();

        let err = provider
            .chat(&[Message::user("hi")], &GenerateParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GemClawError::ApiKeyMissing(_)));
    }

    #[tokio::test]
    async fn test_embeddings_unsupported_provider() {
        let mut config = GemClawConfig::default();
        config.api_key = "gsk-test".into();
        let provider = OpenAiCompatibleProvider::for_backend(lookup("groq").unwrap(), &config).unwrap();
        let err = provider.embed(&["text".to_string()]).await.unwrap_err();
        assert!(matches!(err, GemClawError::Embedding(_)));
    }
}
