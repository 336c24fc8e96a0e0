use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a piece of context came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Email,
    Message,
    Note,
    Document,
}

/// A stored piece of free-form user context used as input for analysis.
///
/// Only [`content`](Self::content) is read by the analyzer and the heuristic
/// generator. The remaining fields ride along so callers can pass their stored
/// records straight through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSample {
    pub id: i64,
    pub content: String,
    #[serde(rename = "user", alias = "associatedUserId", alias = "user_id")]
    pub user_id: i64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContextKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContextSample {
    pub fn new(id: i64, content: impl Into<String>, user_id: i64) -> Self {
        Self {
            id,
            content: content.into(),
            user_id,
            kind: None,
            source: None,
            created_at: None,
        }
    }

    /// Tags the sample with a [`ContextKind`].
    pub fn kind(mut self, kind: ContextKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
