use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{ChatMessage, LLMClient};
use crate::error::LlmError;

/// Policy controlling how many times an operation is retried and the delay
/// between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of additional attempts to make after the first failure.
    pub max_retries: usize,
    /// Delay between retry attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Execute `op` retrying on error according to the policy.
    pub async fn retry<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    warn!(target: "llm", error = %e, attempt = attempts, "retrying model call");
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wrapper around an [`LLMClient`] that applies a [`RetryPolicy`].
///
/// The analyzer never retries by itself; callers opt in by wrapping their client.
/// A completion without content is an answer, not an outage, and is not retried.
pub struct RetryLLM<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryLLM<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C> LLMClient for RetryLLM<C>
where
    C: LLMClient,
{
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.policy
            .retry(|| async {
                match self.inner.chat(messages).await {
                    Err(LlmError::MissingContent { body }) => {
                        Ok(Err(LlmError::MissingContent { body }))
                    }
                    other => other.map(Ok),
                }
            })
            .await?
    }
}
