//! One terminal chat session: an append-only transcript over the orchestrator.

use std::sync::Arc;

use gemclaw_core::types::{Message, Role};

use crate::orchestrator::HybridOrchestrator;

pub struct ChatSession {
    orchestrator: Arc<HybridOrchestrator>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(orchestrator: Arc<HybridOrchestrator>) -> Self {
        Self {
            orchestrator,
            history: Vec::new(),
        }
    }

    /// Answer `query` and record both sides of the exchange.
    pub async fn ask(&mut self, query: &str) -> String {
        self.history.push(Message::user(query));
        let answer = self.orchestrator.answer(query).await;
        self.history.push(Message::assistant(answer.clone()));
        answer
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of questions asked so far.
    pub fn turns(&self) -> usize {
        self.history.iter().filter(|m| m.role == Role::User).count()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::QueryClassifier;
    use gemclaw_core::testing::{CannedTool, ScriptedProvider};
    use gemclaw_core::traits::provider::GenerateParams;

    fn session() -> ChatSession {
        let provider = Arc::new(ScriptedProvider::sequence(&["RAG"]));
        let orchestrator = HybridOrchestrator::new(
            QueryClassifier::new(provider, GenerateParams::default()),
            Arc::new(CannedTool::answering("inventory_sql", "unused")),
            Arc::new(CannedTool::answering("policy_rag", "30 days.")),
        );
        ChatSession::new(Arc::new(orchestrator))
    }

    #[tokio::test]
    async fn test_history_records_exchange() {
        let mut s = session();
        let answer = s.ask("How long is the return window?").await;
        assert_eq!(answer, "**📋 Policy Information:**\n30 days.");

        let history = s.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user("How long is the return window?"));
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, answer);
        assert_eq!(s.turns(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let mut s = session();
        s.ask("one").await;
        s.ask("two").await;
        assert_eq!(s.turns(), 2);
        s.clear();
        assert!(s.history().is_empty());
    }
}
