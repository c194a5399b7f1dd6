//! Test doubles: a scripted LLM provider and a canned answering tool.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GemClawError, Result};
use crate::traits::provider::{GenerateParams, Provider};
use crate::traits::tool::AnswerTool;
use crate::types::{Message, ProviderResponse};

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Provider whose reply is computed from the last user prompt.
///
/// Every prompt it receives is recorded so tests can assert on what was sent.
pub struct ScriptedProvider {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(responder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies with the given strings in order, then repeats the last one.
    pub fn sequence(replies: &[&str]) -> Self {
        let replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        let counter = std::sync::atomic::AtomicUsize::new(0);
        Self::new(move |_| {
            let i = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            replies
                .get(i)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_default()
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, messages: &[Message], _params: &GenerateParams) -> Result<ProviderResponse> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let reply = (self.responder)(&prompt);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        Ok(ProviderResponse {
            content: Some(reply),
            ..Default::default()
        })
    }
}

/// Tool that returns a fixed answer (or a fixed failure) and counts calls.
pub struct CannedTool {
    name: String,
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl CannedTool {
    pub fn answering(name: &str, answer: &str) -> Self {
        Self {
            name: name.into(),
            reply: Ok(answer.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, error: &str) -> Self {
        Self {
            name: name.into(),
            reply: Err(error.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnswerTool for CannedTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn answer(&self, question: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(question.to_string());
        }
        self.reply.clone().map_err(GemClawError::Tool)
    }
}
