use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for hosted language models (Groq, OpenAI, Ollama, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message for a sequence of role/content messages.
    /// System instructions travel inside `messages`, there can be more than one.
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)>;

    /// Generate a reply for a single rendered prompt, sent as one user message
    async fn complete_prompt(&self, prompt: &str) -> Result<(Message, Usage)> {
        self.complete(&[Message::user().with_text(prompt)]).await
    }
}
