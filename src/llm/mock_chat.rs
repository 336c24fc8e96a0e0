use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{ChatMessage, LLMClient};
use crate::error::LlmError;

/// Well-formed analysis returned by [`MockChat::default`].
pub const CANNED_ANALYSIS: &str = r#"{
  "priority": { "score": 3, "reasoning": "No urgency signals in the mock backend.", "confidence": 0.5 },
  "deadline": { "suggested": null, "reasoning": "No date mentioned.", "confidence": 0.2 },
  "category": { "suggested": "General", "reasoning": "Mock backend has no context.", "confidence": 0.3 },
  "enhancedDescription": { "description": "Break the task into concrete steps.", "reasoning": "Generic advice.", "confidence": 0.4 },
  "complexity": { "score": 4, "reasoning": "Assumed moderate.", "confidence": 0.3 },
  "estimatedDuration": { "minutes": 60, "reasoning": "Typical task length.", "confidence": 0.3 }
}"#;

/// Mock chat client returning a fixed reply and recording what it was sent.
pub struct MockChat {
    reply: String,
    calls: AtomicUsize,
    last: Mutex<Vec<ChatMessage>>,
}

impl MockChat {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            last: Mutex::new(Vec::new()),
        }
    }

    /// Number of completed `chat` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages passed to the most recent call.
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Default for MockChat {
    fn default() -> Self {
        Self::new(CANNED_ANALYSIS)
    }
}

#[async_trait]
impl LLMClient for MockChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        trace!(target: "llm", count = messages.len(), "MockChat prompt");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last.lock() {
            *last = messages.to_vec();
        }
        debug!(target: "llm", response = %self.reply, "MockChat full response");
        Ok(self.reply.clone())
    }
}

/// Chat client that always fails.
#[derive(Default)]
pub struct FailingChat;

#[async_trait]
impl LLMClient for FailingChat {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::Other("model offline".into()))
    }
}
