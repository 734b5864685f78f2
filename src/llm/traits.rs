//! Language-model backend trait and shared types

use super::error::LlmError;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Lazy sequence of generated text fragments, in generation order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Prompt handed to a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Instructions sent as the system message
    pub system: String,
    /// User message
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Chat messages in the `{role, content}` shape shared by OpenAI and Ollama
    pub fn messages(&self) -> serde_json::Value {
        let mut messages = Vec::with_capacity(2);
        if !self.system.is_empty() {
            messages.push(serde_json::json!({"role": "system", "content": self.system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": self.user}));
        serde_json::Value::Array(messages)
    }
}

/// A text-generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Model identifier sent to the backend
    fn model(&self) -> &str;

    /// Generate the full completion
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;

    /// Generate incrementally. Connection and status errors are returned
    /// before any fragment; failures after that arrive as stream items.
    async fn stream(&self, prompt: &Prompt) -> Result<FragmentStream, LlmError>;
}
