//! Hybrid orchestrator — classify, dispatch, merge.

use std::sync::Arc;

use gemclaw_core::error::Result;
use gemclaw_core::traits::AnswerTool;

use crate::classifier::QueryClassifier;
use crate::route::Route;

pub const INVENTORY_HEADER: &str = "**📊 Inventory Data:**";
pub const POLICY_HEADER: &str = "**📋 Policy Information:**";
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Routes each query to the inventory tool, the policy tool, or both.
pub struct HybridOrchestrator {
    classifier: QueryClassifier,
    inventory: Arc<dyn AnswerTool>,
    policies: Arc<dyn AnswerTool>,
}

impl HybridOrchestrator {
    pub fn new(
        classifier: QueryClassifier,
        inventory: Arc<dyn AnswerTool>,
        policies: Arc<dyn AnswerTool>,
    ) -> Self {
        Self {
            classifier,
            inventory,
            policies,
        }
    }

    /// Classify `query`, run the selected tools in fixed order (inventory
    /// first) and join their labelled answers.
    pub async fn orchestrate(&self, query: &str) -> Result<String> {
        let route = self.classifier.classify(query).await?;
        self.dispatch(route, query).await
    }

    /// Run the tools for an already-decided route.
    pub async fn dispatch(&self, route: Route, query: &str) -> Result<String> {
        let mut sections = Vec::with_capacity(2);

        if route.uses_structured() {
            tracing::debug!("→ {}", self.inventory.name());
            let answer = self.inventory.answer(query).await?;
            sections.push(format!("{INVENTORY_HEADER}\n{answer}"));
        }
        if route.uses_retrieval() {
            tracing::debug!("→ {}", self.policies.name());
            let answer = self.policies.answer(query).await?;
            sections.push(format!("{POLICY_HEADER}\n{answer}"));
        }

        Ok(sections.join(SECTION_SEPARATOR))
    }

    /// Display-safe entry point: never fails, errors become `Error: ...`.
    pub async fn answer(&self, query: &str) -> String {
        match self.orchestrate(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("❌ Query failed: {e}");
                format!("Error: {e}")
            }
        }
    }
}
