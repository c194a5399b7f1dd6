//! GemClaw configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GemClawError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GemClawConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

fn default_api_key() -> String { String::new() }
fn default_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_temperature() -> f32 { 0.0 }

impl Default for GemClawConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            inventory: InventoryConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

impl GemClawConfig {
    /// Load config from the default path (~/.gemclaw/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GemClawError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GemClawError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the GemClaw home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemclaw")
    }

    /// Provider name, preferring the `[llm]` section over the legacy top-level field.
    pub fn provider_name(&self) -> &str {
        if self.llm.provider.is_empty() {
            &self.default_provider
        } else {
            &self.llm.provider
        }
    }

    /// Chat model, preferring the `[llm]` section over the legacy top-level field.
    pub fn model_name(&self) -> &str {
        if self.llm.model.is_empty() {
            &self.default_model
        } else {
            &self.llm.model
        }
    }
}

/// Expand `~` in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// `[llm]` section — overrides for the chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_tokens() -> u32 { 1024 }
fn default_request_timeout() -> u64 { 120 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: String::new(),
            endpoint: String::new(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// `[embedding]` section.
///
/// `provider = "local"` selects the offline hashing embedder; any registry
/// name uses that provider's `/embeddings` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_local_dimensions")]
    pub local_dimensions: usize,
}

fn default_embedding_provider() -> String { "openai".into() }
fn default_embedding_model() -> String { "text-embedding-ada-002".into() }
fn default_local_dimensions() -> usize { 512 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            local_dimensions: default_local_dimensions(),
        }
    }
}

/// `[inventory]` section — the structured (SQL) side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_db_path() -> String { "inventory.db".into() }
fn default_csv_path() -> String { "diamonds.csv".into() }
fn default_table() -> String { "inventory".into() }
fn default_max_rows() -> usize { 100 }

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            csv_path: default_csv_path(),
            table: default_table(),
            max_rows: default_max_rows(),
        }
    }
}

/// `[knowledge]` section — the unstructured (policy RAG) side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_policy_path")]
    pub policy_path: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "bool_true")]
    pub cache_index: bool,
}

fn bool_true() -> bool { true }
fn default_policy_path() -> String { "grading_policies.txt".into() }
fn default_chunk_size() -> usize { 500 }
fn default_chunk_overlap() -> usize { 50 }
fn default_separator() -> String { "\n\n".into() }
fn default_top_k() -> usize { 4 }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            policy_path: default_policy_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separator: default_separator(),
            top_k: default_top_k(),
            cache_index: true,
        }
    }
}
