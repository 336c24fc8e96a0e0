use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{ChatMessage, LLMClient};
use crate::config::{DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use crate::error::LlmError;

/// Chat client for OpenAI-style `/v1/chat/completions` endpoints
/// (LM Studio, llama.cpp server, vLLM, OpenAI itself).
#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Creates a client posting to the full completion URL `endpoint`.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sends `Authorization: Bearer <key>` with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Upper bound on a single round trip. Expiry surfaces as [`LlmError::Timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Transport {
                url: self.endpoint.clone(),
                source: err,
            }
        }
    }
}

/// Pulls `choices[0].message.content` out of a completion body.
fn completion_text(body: &str) -> Option<String> {
    let parsed: CompletionResponse = serde_json::from_str(body).ok()?;
    parsed.choices.into_iter().next()?.message?.content
}

#[async_trait]
impl LLMClient for ChatCompletionsClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };
        trace!(target: "llm", url = %self.endpoint, model = %self.model, "chat completion prompt");
        let mut req = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            debug!(target: "llm", %status, body = %text, "chat completion rejected");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let content = completion_text(&text).ok_or(LlmError::MissingContent { body: text })?;
        debug!(target: "llm", response = %content, "chat completion full response");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn posts_model_messages_and_temperature() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .json_body(json!({
                        "model": "m",
                        "messages": [
                            {"role": "system", "content": "sys"},
                            {"role": "user", "content": "hi"}
                        ],
                        "temperature": 0.5
                    }));
                then.status(200).json_body(completion("hello"));
            })
            .await;

        let llm = ChatCompletionsClient::new(server.url("/v1/chat/completions"), "m")
            .temperature(0.5);
        let out = llm
            .chat(&[ChatMessage::system("sys"), ChatMessage::user("hi")])
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(completion("ok"));
            })
            .await;

        let llm = ChatCompletionsClient::new(server.url("/v1/chat/completions"), "m")
            .api_key("secret");
        assert_eq!(llm.chat(&[ChatMessage::user("x")]).await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("model crashed");
            })
            .await;

        let llm = ChatCompletionsClient::new(server.url("/v1/chat/completions"), "m");
        let err = llm.chat(&[ChatMessage::user("x")]).await.unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model crashed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_choices_keep_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let llm = ChatCompletionsClient::new(server.url("/v1/chat/completions"), "m");
        let err = llm.chat(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingContent { ref body } if body.contains("choices")));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(completion("late"));
            })
            .await;

        let llm = ChatCompletionsClient::new(server.url("/v1/chat/completions"), "m")
            .timeout(Duration::from_millis(50));
        let err = llm.chat(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let llm = ChatCompletionsClient::new("http://127.0.0.1:9/v1/chat/completions", "m")
            .timeout(Duration::from_secs(2));
        let err = llm.chat(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport { .. } | LlmError::Timeout(_)));
    }

    #[test]
    fn null_content_is_missing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(completion_text(body), None);
        assert_eq!(completion_text("not json"), None);
    }
}
