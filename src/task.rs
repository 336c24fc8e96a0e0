use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::TaskAnalysis;
use crate::suggestions::TaskSuggestion;

/// Task priority, stored by label and scored 1 (Minimal) through 5 (Critical).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Minimal = 1,
    Low = 2,
    #[default]
    Medium = 3,
    High = 4,
    Critical = 5,
}

impl Priority {
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1 => Some(Self::Minimal),
            2 => Some(Self::Low),
            3 => Some(Self::Medium),
            4 => Some(Self::High),
            5 => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Which analysis facet to copy onto a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionField {
    Priority,
    Category,
    Deadline,
    Description,
    Duration,
}

/// A task being composed before it is handed to the task service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builds a draft from a heuristic suggestion.
    pub fn from_suggestion(suggestion: &TaskSuggestion) -> Self {
        Self {
            title: suggestion.title.clone(),
            description: suggestion.description.clone(),
            priority: Priority::from_score(suggestion.priority).unwrap_or_default(),
            category: Some(suggestion.category.clone()),
            ..Self::default()
        }
    }

    /// Copies one facet of `analysis` onto the draft.
    ///
    /// Returns `false` and leaves the draft untouched when the facet has
    /// nothing to apply (no suggested deadline).
    pub fn apply(&mut self, analysis: &TaskAnalysis, field: SuggestionField) -> bool {
        match field {
            SuggestionField::Priority => {
                self.priority = Priority::from_score(analysis.priority.value).unwrap_or_default();
            }
            SuggestionField::Category => {
                self.category = Some(analysis.category.value.clone());
            }
            SuggestionField::Deadline => match analysis.deadline.value {
                Some(at) => self.deadline = Some(at.date_naive()),
                None => return false,
            },
            SuggestionField::Description => {
                self.description = analysis.enhanced_description.value.clone();
            }
            SuggestionField::Duration => {
                self.duration_minutes = Some(analysis.estimated_duration.value);
            }
        }
        true
    }
}

/// Formats minutes as `"{h}h {m}m"`, hours included even when zero.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
