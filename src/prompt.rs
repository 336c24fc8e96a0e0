//! Prompt construction for task analysis.

use serde::Serialize;

use crate::context::ContextSample;
use crate::error::AnalysisError;
use crate::llm::ChatMessage;
use crate::template::render_template;

/// Default number of context samples embedded in a prompt.
pub const MAX_CONTEXT_SAMPLES: usize = 5;

pub const SYSTEM_PROMPT: &str = "You are an intelligent task assistant. Given a task title, description, and user context, return a JSON object with AI analysis.";

const USER_PROMPT: &str = "
Title: {title}
Description: {description}
User Context:
{context}

Return the following JSON format:
{schema}
";

/// Wire schema the model is asked to emit.
pub const RESPONSE_SCHEMA: &str = r#"{
  "priority": { "score": 1-5, "reasoning": "...", "confidence": 0-1 },
  "deadline": { "suggested": "ISO date string", "reasoning": "...", "confidence": 0-1 },
  "category": { "suggested": "...", "reasoning": "...", "confidence": 0-1 },
  "enhancedDescription": { "description": "...", "reasoning": "...", "confidence": 0-1 },
  "complexity": { "score": 1-10, "reasoning": "...", "confidence": 0-1 },
  "estimatedDuration": { "minutes": 0-600, "reasoning": "...", "confidence": 0-1 }
}"#;

#[derive(Serialize)]
struct UserPromptCtx<'a> {
    title: &'a str,
    description: &'a str,
    context: &'a str,
    schema: &'a str,
}

/// One analysis request, built fresh per call.
#[derive(Debug, Clone)]
pub struct TaskAnalysisRequest<'a> {
    title: &'a str,
    description: &'a str,
    samples: &'a [ContextSample],
}

impl<'a> TaskAnalysisRequest<'a> {
    /// Rejects a blank title and keeps at most `max_samples` samples in input order.
    pub fn new(
        title: &'a str,
        description: Option<&'a str>,
        samples: &'a [ContextSample],
        max_samples: usize,
    ) -> Result<Self, AnalysisError> {
        if title.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "task title must not be blank".into(),
            ));
        }
        Ok(Self {
            title,
            description: description.unwrap_or(""),
            samples: &samples[..samples.len().min(max_samples)],
        })
    }

    pub fn title(&self) -> &str {
        self.title
    }

    pub fn samples(&self) -> &[ContextSample] {
        self.samples
    }

    /// Renders the context block, one `Context N: ...` line per sample.
    pub fn context_block(&self) -> String {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Context {}: {}", i + 1, s.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds the system and user messages for the model.
    pub fn messages(&self) -> Result<Vec<ChatMessage>, AnalysisError> {
        let context = self.context_block();
        let user = render_template(
            USER_PROMPT,
            &UserPromptCtx {
                title: self.title,
                description: self.description,
                context: &context,
                schema: RESPONSE_SCHEMA,
            },
        )
        .map_err(|e| AnalysisError::InvalidInput(format!("prompt rendering failed: {e}")))?;
        Ok(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)])
    }
}
