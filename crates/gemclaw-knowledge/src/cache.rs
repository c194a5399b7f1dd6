//! Process-lifetime cache of the policy index.
//!
//! Keyed on the SHA-256 of the document text plus the splitter settings, so
//! an edited policy file or a changed chunk size rebuilds the index while an
//! unchanged one is never re-embedded.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::chunker::TextSplitter;
use crate::index::VectorIndex;

/// Cache key for a document under a given splitter.
pub fn document_key(text: &str, splitter: &TextSplitter) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(
        format!(
            "|{}|{}|{:?}",
            splitter.chunk_size, splitter.chunk_overlap, splitter.separator
        )
        .as_bytes(),
    );
    format!("{:x}", hasher.finalize())
}

/// Holds the index for the most recently seen document.
#[derive(Default)]
pub struct IndexCache {
    slot: Mutex<Option<(String, Arc<VectorIndex>)>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<VectorIndex>> {
        let slot = self.slot.lock().await;
        match slot.as_ref() {
            Some((cached_key, index)) if cached_key == key => Some(index.clone()),
            _ => None,
        }
    }

    pub async fn put(&self, key: String, index: Arc<VectorIndex>) {
        *self.slot.lock().await = Some((key, index));
    }
}
