//! Extension points: LLM providers, embedders and answering tools.

pub mod embedder;
pub mod provider;
pub mod tool;

pub use embedder::Embedder;
pub use provider::Provider;
pub use tool::AnswerTool;
