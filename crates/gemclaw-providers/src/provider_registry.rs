//! Backends the assistant can talk to.
//!
//! All of them speak the OpenAI wire format (`/chat/completions`,
//! `/embeddings`); they differ in host, credentials and whether they serve
//! embeddings. Anything else is reachable as `custom:<base-url>`.

use gemclaw_core::types::ModelInfo;

/// A chat model suggested for a backend.
#[derive(Debug, Clone)]
pub struct ModelDef {
    pub id: &'static str,
    pub name: &'static str,
    pub context_length: u32,
    pub max_output_tokens: Option<u32>,
}

impl ModelDef {
    pub fn to_model_info(&self, provider: &str) -> ModelInfo {
        ModelInfo {
            id: self.id.into(),
            name: self.name.into(),
            provider: provider.into(),
            context_length: self.context_length,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[derive(Debug)]
pub struct Backend {
    pub name: &'static str,
    /// Default base URL, including the `/v1` prefix.
    pub base_url: &'static str,
    /// Env var holding the API key. `None` for local servers without auth.
    pub key_env: Option<&'static str>,
    /// Env var overriding the host, e.g. `OLLAMA_HOST=http://gpu-box:11434`.
    pub host_env: Option<&'static str>,
    pub serves_embeddings: bool,
    pub models: &'static [ModelDef],
}

static BACKENDS: &[Backend] = &[
    Backend {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        key_env: Some("OPENAI_API_KEY"),
        host_env: Some("OPENAI_API_BASE"),
        serves_embeddings: true,
        models: &[
            ModelDef {
                id: "gpt-4o-mini",
                name: "GPT-4o Mini",
                context_length: 128_000,
                max_output_tokens: Some(16_384),
            },
            ModelDef {
                id: "gpt-4o",
                name: "GPT-4o",
                context_length: 128_000,
                max_output_tokens: Some(16_384),
            },
        ],
    },
    Backend {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        key_env: Some("GROQ_API_KEY"),
        host_env: None,
        serves_embeddings: false,
        models: &[ModelDef {
            id: "llama-3.3-70b-versatile",
            name: "Llama 3.3 70B",
            context_length: 128_000,
            max_output_tokens: Some(32_768),
        }],
    },
    Backend {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        key_env: None,
        host_env: Some("OLLAMA_HOST"),
        serves_embeddings: true,
        models: &[ModelDef {
            id: "llama3.2",
            name: "Llama 3.2 (Ollama)",
            context_length: 8192,
            max_output_tokens: None,
        }],
    },
];

pub fn lookup(name: &str) -> Option<&'static Backend> {
    BACKENDS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

pub fn names() -> Vec<&'static str> {
    BACKENDS.iter().map(|b| b.name).collect()
}
