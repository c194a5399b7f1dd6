//! Policy questions answered from retrieved document chunks.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use gemclaw_core::config::KnowledgeConfig;
use gemclaw_core::error::{GemClawError, Result};
use gemclaw_core::traits::provider::{GenerateParams, Provider};
use gemclaw_core::traits::{AnswerTool, Embedder};

use crate::cache::{IndexCache, document_key};
use crate::chunker::TextSplitter;
use crate::index::{ScoredChunk, VectorIndex};

fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following company policy documents:
{context}

Answer this question: {question}

Provide a clear, helpful answer based only on the policy information above."
    )
}

pub struct PolicyRagTool {
    provider: Arc<dyn Provider>,
    embedder: Arc<dyn Embedder>,
    params: GenerateParams,
    policy_path: PathBuf,
    splitter: TextSplitter,
    top_k: usize,
    cache: Option<IndexCache>,
}

impl PolicyRagTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn Embedder>,
        params: GenerateParams,
        config: &KnowledgeConfig,
    ) -> Self {
        Self {
            provider,
            embedder,
            params,
            policy_path: gemclaw_core::config::expand_path(&config.policy_path),
            splitter: TextSplitter::from_config(config),
            top_k: config.top_k.max(1),
            cache: config.cache_index.then(IndexCache::new),
        }
    }

    pub fn policy_path(&self) -> &std::path::Path {
        &self.policy_path
    }

    /// Read the policy document. A missing file is fatal for the request.
    async fn read_document(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.policy_path)
            .await
            .map_err(|e| {
                GemClawError::Knowledge(format!(
                    "cannot read policy document {}: {e}",
                    self.policy_path.display()
                ))
            })
    }

    /// Index for the current document content, rebuilt when the content or
    /// splitter settings differ from the cached one.
    async fn index_for(&self, text: &str) -> Result<Arc<VectorIndex>> {
        let key = document_key(text, &self.splitter);
        if let Some(cache) = &self.cache
            && let Some(index) = cache.get(&key).await
        {
            tracing::debug!("📚 Policy index cache hit ({} chunks)", index.len());
            return Ok(index);
        }

        let chunks = self.splitter.split(text);
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        let index = Arc::new(VectorIndex::build(chunks, vectors)?);
        tracing::info!(
            "📚 Indexed {} with {} chunks",
            self.policy_path.display(),
            index.len()
        );

        if let Some(cache) = &self.cache {
            cache.put(key, index.clone()).await;
        }
        Ok(index)
    }

    /// The top-K chunks for `question`, without asking the model anything.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let text = self.read_document().await?;
        let index = self.index_for(&text).await?;
        if index.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed_query(question).await?;
        Ok(index.search(&query, self.top_k))
    }
}

#[async_trait]
impl AnswerTool for PolicyRagTool {
    fn name(&self) -> &str {
        "policy_rag"
    }

    async fn answer(&self, question: &str) -> Result<String> {
        let hits = self.retrieve(question).await?;
        tracing::debug!(
            "retrieved chunks {:?}",
            hits.iter().map(|h| h.chunk.index).collect::<Vec<_>>()
        );
        let context = hits
            .iter()
            .map(|h| h.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.provider
            .complete(&answer_prompt(&context, question), &self.params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemclaw_core::testing::ScriptedProvider;
    use gemclaw_providers::hashing::HashingEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const POLICIES: &str = "\
Grading Standards. Every diamond is graded on cut, colour, clarity and carat \
weight by two independent gemologists before it is listed in inventory. Grades \
are recorded on the certificate that ships with the stone.

Return Policy. Customers may return any diamond within 30 days of delivery for \
a full refund, provided the stone is accompanied by its original certificate \
and shows no damage. Refunds are issued to the original payment method.

Manager Approval. Any sale of a diamond priced above 10,000 dollars requires \
written approval from a store manager before the invoice is finalised. Sales \
staff must attach the approval to the order record.

Resizing and Engraving. Ring resizing is free within the first year. Custom \
engraving is non-refundable and voids the return window for that item.

Certification Disputes. If a customer disputes a grade, the stone is sent to \
an external laboratory. The company covers the fee when the external grade \
differs from ours.

Insurance. Stones in transit are insured at full retail value. Customers \
collecting in person sign a release at pickup.";

    /// Embedder wrapper that counts how many texts were embedded.
    struct CountingEmbedder {
        inner: HashingEmbedder,
        embedded: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
            self.inner.embed(texts).await
        }
    }

    fn config_for(path: &std::path::Path) -> KnowledgeConfig {
        KnowledgeConfig {
            policy_path: path.to_string_lossy().into_owned(),
            chunk_size: 300,
            chunk_overlap: 50,
            top_k: 2,
            ..KnowledgeConfig::default()
        }
    }

    fn tool_with(
        config: &KnowledgeConfig,
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn Embedder>,
    ) -> PolicyRagTool {
        PolicyRagTool::new(provider, embedder, GenerateParams::default(), config)
    }

    fn echo_provider() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new(|prompt| format!("ANSWER FROM: {prompt}")))
    }

    #[tokio::test]
    async fn test_retrieval_recall() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading_policies.txt");
        std::fs::write(&path, POLICIES).unwrap();

        let tool = tool_with(
            &config_for(&path),
            echo_provider(),
            Arc::new(HashingEmbedder::default()),
        );
        let hits = tool
            .retrieve("Does selling an expensive diamond need a manager's written approval?")
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(
            hits.iter()
                .any(|h| h.chunk.content.contains("requires written approval from a store manager")),
            "hits: {hits:?}"
        );
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading_policies.txt");
        std::fs::write(&path, POLICIES).unwrap();

        let mut config = config_for(&path);
        config.cache_index = false;
        let tool = tool_with(&config, echo_provider(), Arc::new(HashingEmbedder::default()));

        let q = "How many days do customers have to return a diamond?";
        let first: Vec<usize> = tool.retrieve(q).await.unwrap().iter().map(|h| h.chunk.index).collect();
        let second: Vec<usize> = tool.retrieve(q).await.unwrap().iter().map(|h| h.chunk.index).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_answer_uses_only_retrieved_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading_policies.txt");
        std::fs::write(&path, POLICIES).unwrap();

        let provider = echo_provider();
        let tool = tool_with(&config_for(&path), provider.clone(), Arc::new(HashingEmbedder::default()));
        let answer = tool.answer("What is the return policy?").await.unwrap();

        assert!(answer.starts_with("ANSWER FROM: Based on the following company policy documents:"));
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("return any diamond within 30 days"));
        assert!(prompts[0].contains("Answer this question: What is the return policy?"));
    }

    #[test]
    fn test_answer_prompt_keeps_braces_in_context() {
        let prompt = answer_prompt("Refer to form {question} for returns.", "What is {context}?");
        assert!(prompt.contains("\nRefer to form {question} for returns.\n"));
        assert!(prompt.contains("Answer this question: What is {context}?\n"));
    }

    #[tokio::test]
    async fn test_cache_skips_reembedding_until_document_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading_policies.txt");
        std::fs::write(&path, POLICIES).unwrap();

        let embedder = Arc::new(CountingEmbedder {
            inner: HashingEmbedder::default(),
            embedded: AtomicUsize::new(0),
        });
        let tool = tool_with(&config_for(&path), echo_provider(), embedder.clone());

        tool.retrieve("return policy").await.unwrap();
        let after_first = embedder.embedded.load(Ordering::SeqCst);
        tool.retrieve("return policy").await.unwrap();
        // second call embeds only the question
        assert_eq!(embedder.embedded.load(Ordering::SeqCst), after_first + 1);

        std::fs::write(&path, format!("{POLICIES}\n\nGift Cards. Gift cards never expire.")).unwrap();
        tool.retrieve("gift cards").await.unwrap();
        assert!(embedder.embedded.load(Ordering::SeqCst) > after_first + 2);
    }

    #[tokio::test]
    async fn test_missing_document_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool_with(
            &config_for(&dir.path().join("nope.txt")),
            echo_provider(),
            Arc::new(HashingEmbedder::default()),
        );
        let err = tool.answer("What is the return policy?").await.unwrap_err();
        assert!(matches!(err, GemClawError::Knowledge(_)));
    }

    #[tokio::test]
    async fn test_empty_document_gives_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        let tool = tool_with(&config_for(&path), echo_provider(), Arc::new(HashingEmbedder::default()));
        assert!(tool.retrieve("anything").await.unwrap().is_empty());
    }
}
