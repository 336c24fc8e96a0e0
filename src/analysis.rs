//! Typed model output and its validation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::AnalysisError;

pub const PRIORITY_RANGE: (i64, i64) = (1, 5);
pub const COMPLEXITY_RANGE: (i64, i64) = (1, 10);
pub const DURATION_RANGE: (i64, i64) = (0, 600);

const FACETS: [&str; 6] = [
    "priority",
    "deadline",
    "category",
    "enhancedDescription",
    "complexity",
    "estimatedDuration",
];

/// What to do with a numeric value outside its allowed range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePolicy {
    /// Fail the whole analysis with [`AnalysisError::MalformedResponse`].
    #[default]
    Reject,
    /// Pull the value to the nearest bound and keep going.
    Clamp,
}

/// One scored recommendation: a payload plus the model's reasoning and
/// self-reported confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet<T> {
    pub value: T,
    pub reasoning: String,
    pub confidence: f64,
}

/// Structured recommendations for a single task.
///
/// | facet | value |
/// |---|---|
/// | `priority` | score 1–5 |
/// | `deadline` | suggested date-time, if any |
/// | `category` | suggested category name |
/// | `enhanced_description` | rewritten description |
/// | `complexity` | score 1–10 |
/// | `estimated_duration` | minutes, 0–600 |
///
/// Serialized, each facet names its payload the way the model emits it
/// (`score`, `suggested`, `description`, `minutes`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    #[serde(serialize_with = "as_score")]
    pub priority: Facet<u8>,
    #[serde(serialize_with = "as_suggested")]
    pub deadline: Facet<Option<DateTime<FixedOffset>>>,
    #[serde(serialize_with = "as_suggested")]
    pub category: Facet<String>,
    #[serde(serialize_with = "as_description")]
    pub enhanced_description: Facet<String>,
    #[serde(serialize_with = "as_score")]
    pub complexity: Facet<u8>,
    #[serde(serialize_with = "as_minutes")]
    pub estimated_duration: Facet<u32>,
}

impl<T: Serialize> Facet<T> {
    fn serialize_keyed<S: Serializer>(&self, key: &'static str, s: S) -> Result<S::Ok, S::Error> {
        let mut facet = s.serialize_struct("Facet", 3)?;
        facet.serialize_field(key, &self.value)?;
        facet.serialize_field("reasoning", &self.reasoning)?;
        facet.serialize_field("confidence", &self.confidence)?;
        facet.end()
    }
}

fn as_score<T: Serialize, S: Serializer>(facet: &Facet<T>, s: S) -> Result<S::Ok, S::Error> {
    facet.serialize_keyed("score", s)
}

fn as_suggested<T: Serialize, S: Serializer>(facet: &Facet<T>, s: S) -> Result<S::Ok, S::Error> {
    facet.serialize_keyed("suggested", s)
}

fn as_description<T: Serialize, S: Serializer>(
    facet: &Facet<T>,
    s: S,
) -> Result<S::Ok, S::Error> {
    facet.serialize_keyed("description", s)
}

fn as_minutes<T: Serialize, S: Serializer>(facet: &Facet<T>, s: S) -> Result<S::Ok, S::Error> {
    facet.serialize_keyed("minutes", s)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    priority: WireScore,
    deadline: WireDeadline,
    category: WireCategory,
    enhanced_description: WireDescription,
    complexity: WireScore,
    estimated_duration: WireDuration,
}

#[derive(Deserialize)]
struct WireScore {
    score: Number,
    #[serde(default)]
    reasoning: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct WireDeadline {
    #[serde(default)]
    suggested: Option<String>,
    #[serde(default)]
    reasoning: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct WireCategory {
    suggested: String,
    #[serde(default)]
    reasoning: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct WireDescription {
    description: String,
    #[serde(default)]
    reasoning: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct WireDuration {
    minutes: Number,
    #[serde(default)]
    reasoning: String,
    confidence: f64,
}

/// Strips one surrounding Markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

/// Offset-carrying ISO 8601 shapes tried after RFC 3339. A trailing `Z` is
/// rewritten to `+00:00` first.
const OFFSET_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%#z",
];

/// Date-times without an offset, read as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
];

fn parse_deadline(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at);
    }
    let zoned = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => text.to_string(),
    };
    OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&zoned, f).ok())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|n| n.and_utc().fixed_offset())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc().fixed_offset())
        })
}

/// Reads a JSON number as a whole number, saturating beyond `i64`.
/// Fractional values give `None`.
fn whole_number(number: &Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|_| i64::MAX))
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
}

struct Validator<'a> {
    raw: &'a str,
    policy: RangePolicy,
}

impl Validator<'_> {
    fn int(&self, field: &str, number: &Number, (lo, hi): (i64, i64)) -> Result<i64, AnalysisError> {
        let value = whole_number(number).ok_or_else(|| {
            AnalysisError::malformed(self.raw, format!("{field} = {number} is not a whole number"))
        })?;
        if (lo..=hi).contains(&value) {
            return Ok(value);
        }
        match self.policy {
            RangePolicy::Reject => Err(AnalysisError::malformed(
                self.raw,
                format!("{field} = {number} is outside {lo}..={hi}"),
            )),
            RangePolicy::Clamp => {
                let clamped = value.clamp(lo, hi);
                warn!(field, value = %number, clamped, "clamping out-of-range model value");
                Ok(clamped)
            }
        }
    }

    fn confidence(&self, facet: &str, value: f64) -> Result<f64, AnalysisError> {
        if (0.0..=1.0).contains(&value) {
            return Ok(value);
        }
        match self.policy {
            RangePolicy::Reject => Err(AnalysisError::malformed(
                self.raw,
                format!("{facet}.confidence = {value} is outside 0..=1"),
            )),
            RangePolicy::Clamp => {
                let clamped = value.clamp(0.0, 1.0);
                warn!(facet, value, clamped, "clamping out-of-range confidence");
                Ok(clamped)
            }
        }
    }

    fn facet<T>(
        &self,
        name: &str,
        value: T,
        reasoning: String,
        confidence: f64,
    ) -> Result<Facet<T>, AnalysisError> {
        Ok(Facet {
            value,
            reasoning,
            confidence: self.confidence(name, confidence)?,
        })
    }
}

impl TaskAnalysis {
    /// Parses raw model text into a validated analysis.
    ///
    /// Either every facet validates or the whole call fails; there is no
    /// partially filled result. The raw text is attached to every
    /// [`AnalysisError::MalformedResponse`].
    pub fn parse(raw: &str, policy: RangePolicy) -> Result<Self, AnalysisError> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AnalysisError::malformed(raw, format!("response is not JSON: {e}")))?;
        let Some(object) = value.as_object() else {
            return Err(AnalysisError::malformed(raw, "response is not a JSON object"));
        };
        if let Some(missing) = FACETS.iter().find(|f| !object.contains_key(**f)) {
            return Err(AnalysisError::malformed(
                raw,
                format!("missing facet `{missing}`"),
            ));
        }
        let wire: WireAnalysis = serde_json::from_value(value)
            .map_err(|e| AnalysisError::malformed(raw, format!("facet has wrong shape: {e}")))?;

        let v = Validator { raw, policy };

        let priority = v.int("priority.score", &wire.priority.score, PRIORITY_RANGE)?;
        let complexity = v.int("complexity.score", &wire.complexity.score, COMPLEXITY_RANGE)?;
        let minutes = v.int(
            "estimatedDuration.minutes",
            &wire.estimated_duration.minutes,
            DURATION_RANGE,
        )?;
        let deadline = match wire.deadline.suggested.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(parse_deadline(text).ok_or_else(|| {
                AnalysisError::malformed(raw, format!("deadline.suggested `{text}` is not a date"))
            })?),
        };

        // Ranges above fit the target integer types.
        Ok(Self {
            priority: v.facet(
                "priority",
                priority as u8,
                wire.priority.reasoning,
                wire.priority.confidence,
            )?,
            deadline: v.facet(
                "deadline",
                deadline,
                wire.deadline.reasoning,
                wire.deadline.confidence,
            )?,
            category: v.facet(
                "category",
                wire.category.suggested,
                wire.category.reasoning,
                wire.category.confidence,
            )?,
            enhanced_description: v.facet(
                "enhancedDescription",
                wire.enhanced_description.description,
                wire.enhanced_description.reasoning,
                wire.enhanced_description.confidence,
            )?,
            complexity: v.facet(
                "complexity",
                complexity as u8,
                wire.complexity.reasoning,
                wire.complexity.confidence,
            )?,
            estimated_duration: v.facet(
                "estimatedDuration",
                minutes as u32,
                wire.estimated_duration.reasoning,
                wire.estimated_duration.confidence,
            )?,
        })
    }
}
