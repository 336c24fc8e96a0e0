//! Keyword classification of free-form context text.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A theme detected in context text by substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Urgent,
    Work,
    Personal,
    Health,
    Learning,
    Finance,
    Home,
}

const URGENT: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "emergency",
    "critical",
    "deadline",
    "due",
];
const WORK: &[&str] = &[
    "meeting",
    "project",
    "presentation",
    "client",
    "office",
    "report",
    "proposal",
];
const PERSONAL: &[&str] = &[
    "doctor", "family", "grocery", "workout", "vacation", "birthday", "personal",
];
const HEALTH: &[&str] = &[
    "exercise",
    "gym",
    "medical",
    "appointment",
    "health",
    "fitness",
    "doctor",
];
const LEARNING: &[&str] = &[
    "study", "course", "learn", "research", "book", "tutorial", "training",
];
const FINANCE: &[&str] = &[
    "budget",
    "money",
    "bank",
    "payment",
    "invoice",
    "tax",
    "financial",
];
const HOME: &[&str] = &[
    "clean",
    "repair",
    "maintenance",
    "garden",
    "home",
    "house",
    "kitchen",
];

impl KeywordCategory {
    pub const ALL: [KeywordCategory; 7] = [
        Self::Urgent,
        Self::Work,
        Self::Personal,
        Self::Health,
        Self::Learning,
        Self::Finance,
        Self::Home,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Learning => "learning",
            Self::Finance => "finance",
            Self::Home => "home",
        }
    }

    /// Lowercase substrings that put text into this category.
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            Self::Urgent => URGENT,
            Self::Work => WORK,
            Self::Personal => PERSONAL,
            Self::Health => HEALTH,
            Self::Learning => LEARNING,
            Self::Finance => FINANCE,
            Self::Home => HOME,
        }
    }

    fn matches(self, lowered: &str) -> bool {
        self.triggers().iter().any(|t| lowered.contains(t))
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeywordCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown keyword category: {s}"))
    }
}

/// Returns every category with at least one trigger inside `text`.
///
/// Matching is case-insensitive and by plain substring, so `"emergencyroom"`
/// still counts as urgent.
///
/// ```
/// use taskwise::keywords::{classify, KeywordCategory};
/// let found = classify("URGENT: submit report ASAP");
/// assert!(found.contains(&KeywordCategory::Urgent));
/// assert!(found.contains(&KeywordCategory::Work));
/// ```
pub fn classify(text: &str) -> BTreeSet<KeywordCategory> {
    let lowered = text.to_lowercase();
    KeywordCategory::ALL
        .into_iter()
        .filter(|c| c.matches(&lowered))
        .collect()
}
