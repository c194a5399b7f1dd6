//! # GemClaw Agent
//!
//! Hybrid question answering over the diamond inventory and the company
//! policy document.
//!
//! Each query is classified by the model as inventory (`SQL`), policy (`RAG`)
//! or `BOTH`, dispatched to the matching tool(s) in a fixed order, and the
//! labelled answers are joined into a single response.

pub mod classifier;
pub mod orchestrator;
pub mod route;
pub mod session;

use std::sync::Arc;

use gemclaw_core::config::{GemClawConfig, expand_path};
use gemclaw_core::error::Result;
use gemclaw_core::traits::provider::GenerateParams;
use gemclaw_inventory::{InventoryDb, SqlQueryTool};
use gemclaw_knowledge::PolicyRagTool;

pub use classifier::QueryClassifier;
pub use orchestrator::HybridOrchestrator;
pub use route::Route;
pub use session::ChatSession;

/// Wire provider, embedder, inventory database and policy tool from config.
pub fn build_orchestrator(config: &GemClawConfig) -> Result<HybridOrchestrator> {
    let provider = gemclaw_providers::create_provider(config)?;
    let embedder = gemclaw_providers::create_embedder(config)?;
    let params = GenerateParams::from_config(config);

    let db_path = expand_path(&config.inventory.db_path);
    let db = Arc::new(InventoryDb::open(&db_path)?);

    let inventory = SqlQueryTool::new(provider.clone(), params.clone(), db)
        .with_max_rows(config.inventory.max_rows);
    let policies = PolicyRagTool::new(provider.clone(), embedder, params.clone(), &config.knowledge);

    tracing::info!(
        "🤖 Agent ready: provider={}, model={}, inventory={}, policies={}",
        provider.name(),
        params.model,
        db_path.display(),
        policies.policy_path().display()
    );

    Ok(HybridOrchestrator::new(
        QueryClassifier::new(provider, params),
        Arc::new(inventory),
        Arc::new(policies),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GemClawConfig::default();
        config.default_provider = "ollama".into();
        config.embedding.provider = "local".into();
        config.inventory.db_path = dir.path().join("inventory.db").to_string_lossy().into_owned();
        config.knowledge.policy_path = dir.path().join("policies.txt").to_string_lossy().into_owned();

        assert!(build_orchestrator(&config).is_ok());
    }

    #[test]
    fn test_unknown_provider_fails() {
        let mut config = GemClawConfig::default();
        config.default_provider = "nope".into();
        assert!(build_orchestrator(&config).is_err());
    }
}
