//! Local keyword/number scorer.
//!
//! Used when no scoring service is configured. It is deterministic and fast,
//! and deliberately coarse. When both `work_hours` and `stress` are answered
//! with numbers, the score is the workload formula alone. Otherwise strain
//! indicators push the score up and wellbeing indicators pull it down.

use async_trait::async_trait;
use regex::Regex;
use tracing::trace;

use super::{RiskScorer, ScoreResult, ScoringError};
use crate::types::{RiskScore, SurveyResponses};

/// Score when no signals are present at all.
const BASELINE: f64 = 20.0;
/// Points added per strain indicator.
const STRAIN_WEIGHT: f64 = 12.0;
/// Points removed per wellbeing indicator.
const WELLBEING_WEIGHT: f64 = 8.0;
/// Weekly hours that count as a normal load.
const NORMAL_HOURS: f64 = 40.0;

const STRAIN_PATTERNS: &[&str] = &[
    r"(?i)\btired\b",
    r"(?i)\bexhaust",
    r"(?i)\bburn(?:ed|t)?[\s-]?out\b",
    r"(?i)\boverwhelm",
    r"(?i)\bstress",
    r"(?i)\banxi(?:ous|ety)\b",
    r"(?i)\binsomnia\b",
    r"(?i)\bcan'?t\s+sleep\b",
    r"(?i)\boverwork",
    r"(?i)\bdrained\b",
    r"(?i)\bhopeless",
    r"(?i)\bquit(?:ting)?\b",
    r"(?i)\bunmotivated\b",
    r"(?i)\bno\s+motivation\b",
    r"(?i)\bisolated\b",
];

const WELLBEING_PATTERNS: &[&str] = &[
    r"(?i)\benergi[sz]ed\b",
    r"(?i)\bmotivated\b",
    r"(?i)\bbalanced?\b",
    r"(?i)\brested\b",
    r"(?i)\bsupported\b",
    r"(?i)\bhappy\b",
    r"(?i)\benjoy",
    r"(?i)\bmanageable\b",
    r"(?i)\bcalm\b",
];

/// Deterministic local scorer.
pub struct HeuristicScorer {
    strain: Vec<Regex>,
    wellbeing: Vec<Regex>,
}

impl HeuristicScorer {
    /// Create a scorer with the built-in indicator patterns.
    pub fn new() -> Self {
        Self {
            strain: compile(STRAIN_PATTERNS),
            wellbeing: compile(WELLBEING_PATTERNS),
        }
    }

    /// Score answers without going through the async trait.
    pub fn evaluate(&self, responses: &SurveyResponses) -> ScoreResult {
        let hours = numeric_answer(responses, &["work_hours", "hours"]);
        let stress = numeric_answer(responses, &["stress", "stress_level"]);

        let raw = match (hours, stress) {
            (Some(hours), Some(stress)) => workload(hours, stress),
            _ => self.keyword_score(responses),
        };
        trace!(?hours, ?stress, raw, "heuristic score");

        ScoreResult::from_score(RiskScore::saturating(raw.round() as i64))
    }

    fn keyword_score(&self, responses: &SurveyResponses) -> f64 {
        // Numeric answers are excluded from keyword matching.
        let mut strain = 0usize;
        let mut wellbeing = 0usize;
        for (question, answer) in responses.iter() {
            if is_numeric_question(question) {
                continue;
            }
            strain += self.strain.iter().filter(|re| re.is_match(answer)).count();
            wellbeing += self.wellbeing.iter().filter(|re| re.is_match(answer)).count();
        }

        BASELINE + strain as f64 * STRAIN_WEIGHT - wellbeing as f64 * WELLBEING_WEIGHT
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RiskScorer for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn score(&self, responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
        Ok(self.evaluate(responses))
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Hours relative to a normal week and stress out of ten, weighted equally.
fn workload(hours: f64, stress: f64) -> f64 {
    (hours / NORMAL_HOURS) * 50.0 + (stress / 10.0) * 50.0
}

fn is_numeric_question(question: &str) -> bool {
    matches!(question, "work_hours" | "hours" | "stress" | "stress_level")
}

fn numeric_answer(responses: &SurveyResponses, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| responses.get(key))
        .find_map(|answer| answer.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
}
