//! LLM-backed query classifier.

use std::sync::Arc;

use gemclaw_core::error::Result;
use gemclaw_core::traits::provider::{GenerateParams, Provider};

use crate::route::Route;

fn classify_prompt(query: &str) -> String {
    format!(
        "Classify this query into exactly one category:

- SQL: inventory numbers, prices, counts, diamond attributes (carat, cut, color, clarity)
- RAG: company policies, return rules, grading standards, manager approvals
- BOTH: needs inventory data AND policy information

Query: {query}

Respond with exactly one word: SQL, RAG, or BOTH"
    )
}

pub struct QueryClassifier {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
}

impl QueryClassifier {
    pub fn new(provider: Arc<dyn Provider>, params: GenerateParams) -> Self {
        Self { provider, params }
    }

    /// Ask the model for a label and parse it. Provider failures propagate;
    /// an unparseable reply becomes [`Route::Unknown`].
    pub async fn classify(&self, query: &str) -> Result<Route> {
        let reply = self
            .provider
            .complete(&classify_prompt(query), &self.params)
            .await?;
        let route = Route::parse(&reply);
        if route == Route::Unknown {
            tracing::warn!("⚠️ Unrecognized classification {:?}, falling back to policy search", reply.trim());
        } else {
            tracing::info!("🧭 Routed query as {route}");
        }
        Ok(route)
    }
}
