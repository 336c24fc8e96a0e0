//! Rule-based task suggestions that need no model call.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::context::ContextSample;
use crate::keywords::{KeywordCategory, classify};

/// Only this many leading context entries are scanned.
pub const MAX_SCANNED_ENTRIES: usize = 5;
/// Upper bound on the suggestions returned for one batch.
pub const MAX_SUGGESTIONS: usize = 3;
const EXCERPT_CHARS: usize = 50;

/// A candidate task proposed from context text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSuggestion {
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub category: String,
    pub reasoning: String,
}

struct Rule {
    phrases: &'static [&'static str],
    title: &'static str,
    framing: &'static str,
    priority: u8,
    category: fn(&BTreeSet<KeywordCategory>) -> &'static str,
    reasoning: &'static str,
}

fn work_or_personal(keywords: &BTreeSet<KeywordCategory>) -> &'static str {
    if keywords.contains(&KeywordCategory::Work) {
        "Work"
    } else {
        "Personal"
    }
}

fn health_or_personal(keywords: &BTreeSet<KeywordCategory>) -> &'static str {
    if keywords.contains(&KeywordCategory::Health) {
        "Health"
    } else {
        "Personal"
    }
}

fn work(_: &BTreeSet<KeywordCategory>) -> &'static str {
    "Work"
}

fn finance(_: &BTreeSet<KeywordCategory>) -> &'static str {
    "Finance"
}

fn learning(_: &BTreeSet<KeywordCategory>) -> &'static str {
    "Learning"
}

/// Evaluated in order; each rule adds at most one suggestion per entry.
static RULES: [Rule; 5] = [
    Rule {
        phrases: &["meeting"],
        title: "Prepare for upcoming meeting",
        framing: "Based on context",
        priority: 4,
        category: work_or_personal,
        reasoning: "Meeting reference detected in context",
    },
    Rule {
        phrases: &["appointment"],
        title: "Schedule appointment",
        framing: "Follow up on",
        priority: 3,
        category: health_or_personal,
        reasoning: "Appointment mentioned in context",
    },
    Rule {
        phrases: &["deadline", "due"],
        title: "Work on deadline item",
        framing: "Address",
        priority: 5,
        category: work,
        reasoning: "Deadline detected in context",
    },
    Rule {
        phrases: &["budget", "payment"],
        title: "Handle financial task",
        framing: "Review",
        priority: 4,
        category: finance,
        reasoning: "Financial task detected in context",
    },
    Rule {
        phrases: &["learn", "study"],
        title: "Learning activity",
        framing: "Study",
        priority: 3,
        category: learning,
        reasoning: "Learning opportunity detected in context",
    },
];

fn excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_CHARS).collect()
}

fn suggestions_for(sample: &ContextSample) -> impl Iterator<Item = TaskSuggestion> + '_ {
    let keywords = classify(&sample.content);
    let lowered = sample.content.to_lowercase();
    RULES
        .iter()
        .filter(move |rule| rule.phrases.iter().any(|p| lowered.contains(p)))
        .map(move |rule| TaskSuggestion {
            title: rule.title.to_string(),
            description: format!("{}: \"{}...\"", rule.framing, excerpt(&sample.content)),
            priority: rule.priority,
            category: (rule.category)(&keywords).to_string(),
            reasoning: rule.reasoning.to_string(),
        })
}

/// Proposes tasks from the first [`MAX_SCANNED_ENTRIES`] context entries.
///
/// All suggestions are collected in entry order, then rule order, and only
/// then cut down to [`MAX_SUGGESTIONS`]. Deterministic and free of I/O.
pub fn generate_task_suggestions(samples: &[ContextSample]) -> Vec<TaskSuggestion> {
    let mut all: Vec<TaskSuggestion> = samples
        .iter()
        .take(MAX_SCANNED_ENTRIES)
        .flat_map(suggestions_for)
        .collect();
    debug!(found = all.len(), kept = all.len().min(MAX_SUGGESTIONS), "heuristic suggestions");
    all.truncate(MAX_SUGGESTIONS);
    all
}
