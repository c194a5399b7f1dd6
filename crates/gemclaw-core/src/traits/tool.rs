//! Answering tools the orchestrator dispatches to.

use async_trait::async_trait;

use crate::error::Result;

/// A tool that turns a natural-language question into a natural-language answer.
#[async_trait]
pub trait AnswerTool: Send + Sync {
    fn name(&self) -> &str;

    async fn answer(&self, question: &str) -> Result<String>;
}
