use std::time::Duration;
use thiserror::Error;

/// Failure reported by an [`LLMClient`](crate::llm::LLMClient).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model request timed out after {0:?}")]
    Timeout(Duration),

    #[error("model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion had no choices[0].message.content")]
    MissingContent { body: String },

    #[error("{0}")]
    Other(String),
}

/// Failure reported by [`TaskAnalyzer::analyze_task`](crate::TaskAnalyzer::analyze_task).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The caller broke a precondition, such as passing a blank title.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model call did not complete successfully.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[source] LlmError),

    /// The model answered, but not with a valid six-facet analysis.
    #[error("malformed model response: {reason}")]
    MalformedResponse { raw: String, reason: String },
}

impl AnalysisError {
    pub(crate) fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Returns the raw model text attached to a [`MalformedResponse`](Self::MalformedResponse).
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingContent { body } => {
                Self::malformed(body, "completion had no choices[0].message.content")
            }
            other => Self::ModelUnavailable(other),
        }
    }
}
