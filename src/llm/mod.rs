pub mod chat_completions;
pub mod mock_chat;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message sent to a chat-completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Common interface for chat-based language models.
///
/// One call is one request/response round trip. Implementations do not retry;
/// wrap a client in [`retry::RetryLLM`] when that is wanted.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends `messages` and returns the full completion text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: LLMClient + ?Sized> LLMClient for Arc<T> {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        (**self).chat(messages).await
    }
}
