//! # GemClaw Knowledge Base
//!
//! The unstructured half of the assistant: answers policy questions from a
//! plain-text document.
//!
//! ## How it works
//! ```text
//! grading_policies.txt
//!   ↓ split on blank lines, merge to ≤500 chars, 50 chars overlap
//! chunks ──embed──▶ VectorIndex (cached per document hash)
//!   ↓ cosine similarity against the embedded question
//! top 4 chunks joined as context
//!   ↓ LLM, "answer based only on the policy information above"
//! grounded answer
//! ```

pub mod cache;
pub mod chunker;
pub mod index;
pub mod tool;

pub use chunker::{Chunk, TextSplitter};
pub use index::{ScoredChunk, VectorIndex};
pub use tool::PolicyRagTool;
