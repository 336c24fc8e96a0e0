use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::llm::LLMClient;
use crate::llm::chat_completions::ChatCompletionsClient;
use crate::llm::mock_chat::MockChat;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-2-7b-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the language model backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `"chat-completions"` for an HTTP endpoint or `"mock"` for the canned
    /// offline backend.
    pub provider: String,
    /// Full URL of the chat completion endpoint.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Bearer token for hosted endpoints.
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "chat-completions".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    llm: LlmConfig,
}

impl LlmConfig {
    /// Applies `LLM_API_URL`, `LLM_MODEL` and `LLM_API_KEY` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("LLM_API_URL") {
            self.endpoint = url;
        }
        if let Some(model) = get("LLM_MODEL") {
            self.model = model;
        }
        if let Some(key) = get("LLM_API_KEY") {
            self.api_key = Some(key);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Instantiates the configured backend.
    pub fn build_client(&self) -> anyhow::Result<Arc<dyn LLMClient>> {
        match self.provider.as_str() {
            "chat-completions" | "openai" => {
                let mut client = ChatCompletionsClient::new(&self.endpoint, &self.model)
                    .temperature(self.temperature)
                    .timeout(self.timeout());
                if let Some(key) = &self.api_key {
                    client = client.api_key(key);
                }
                Ok(Arc::new(client))
            }
            "mock" => Ok(Arc::new(MockChat::default())),
            other => anyhow::bail!("unsupported provider: {}", other),
        }
    }
}

/// Load an [`LlmConfig`] from the `[llm]` table of a TOML file.
///
/// # Examples
///
/// ```no_run
/// use taskwise::config::load;
/// # tokio_test::block_on(async {
/// let cfg = load("taskwise.toml").await.unwrap();
/// assert!(!cfg.model.is_empty());
/// # });
/// ```
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<LlmConfig> {
    let text = tokio::fs::read_to_string(path).await?;
    let file: ConfigFile = toml::from_str(&text)?;
    Ok(file.llm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_local_llm_server() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.model, "llama-2-7b-chat");
        assert_eq!(cfg.temperature, 0.7);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_replace_non_empty_values() {
        let env: HashMap<&str, &str> = [
            ("LLM_API_URL", "http://10.0.0.2:8080/v1/chat/completions"),
            ("LLM_MODEL", "  "),
            ("LLM_API_KEY", "k"),
        ]
        .into_iter()
        .collect();
        let cfg = LlmConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.endpoint, "http://10.0.0.2:8080/v1/chat/completions");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let cfg = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        assert!(cfg.build_client().is_err());
    }
}
