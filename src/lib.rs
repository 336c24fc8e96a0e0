//! AI task analysis and rule-based task suggestions.
//!
//! [`TaskAnalyzer`] asks a chat-completion model for structured, confidence
//! scored recommendations about a task. [`generate_task_suggestions`] proposes
//! new tasks from context text using fixed keyword rules and no model at all.

pub mod analysis;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod keywords;
pub mod llm;
pub mod prompt;
pub mod suggestions;
pub mod task;
mod template;

pub use analysis::{Facet, RangePolicy, TaskAnalysis};
pub use analyzer::TaskAnalyzer;
pub use config::LlmConfig;
pub use context::{ContextKind, ContextSample};
pub use error::{AnalysisError, LlmError};
pub use keywords::{KeywordCategory, classify};
pub use llm::{ChatMessage, ChatRole, LLMClient};
pub use suggestions::{TaskSuggestion, generate_task_suggestions};
pub use task::{Priority, SuggestionField, TaskDraft, TaskStatus, format_duration};
pub use template::render_template;
