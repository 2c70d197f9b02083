//! Core type definitions shared by the store, adapters and pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned identifier of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub i64);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Burnout risk score, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RiskScore(u8);

impl RiskScore {
    /// Highest representable score.
    pub const MAX: u8 = 100;

    /// Build a score, rejecting anything outside `0..=100`.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Build a score, clamping into `0..=100`.
    #[must_use]
    pub fn saturating(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RiskScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| ValidationError::new(format!("risk score out of range: {}", value)))
    }
}

impl From<RiskScore> for i64 {
    fn from(score: RiskScore) -> Self {
        i64::from(score.0)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk band attached to every assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    Urgent,
}

impl RiskLabel {
    /// Convert to database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// Parse a label, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Band for a score when no label was supplied.
    ///
    /// 0-39 Low, 40-69 Medium, 70-84 High, 85-100 Urgent.
    #[must_use]
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            0..=39 => Self::Low,
            40..=69 => Self::Medium,
            70..=84 => Self::High,
            _ => Self::Urgent,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text survey answers keyed by question id.
///
/// Numbers and booleans submitted by the dashboard are kept as their text
/// form so scorers only ever see strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, AnswerValue>", into = "BTreeMap<String, String>")]
pub struct SurveyResponses(BTreeMap<String, String>);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Null(()),
}

impl From<BTreeMap<String, AnswerValue>> for SurveyResponses {
    fn from(raw: BTreeMap<String, AnswerValue>) -> Self {
        let answers = raw
            .into_iter()
            .filter_map(|(question, value)| {
                let text = match value {
                    AnswerValue::Text(text) => text,
                    AnswerValue::Number(number) => number.to_string(),
                    AnswerValue::Flag(flag) => flag.to_string(),
                    AnswerValue::Null(()) => return None,
                };
                Some((question, text))
            })
            .collect();
        Self(answers)
    }
}

impl From<SurveyResponses> for BTreeMap<String, String> {
    fn from(responses: SurveyResponses) -> Self {
        responses.0
    }
}

impl SurveyResponses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer, replacing any previous answer to the same question.
    #[must_use]
    pub fn with_answer(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.0.insert(question.into(), answer.into());
        self
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fixed-width RFC 3339 rendering, so text order equals time order.
#[must_use]
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
