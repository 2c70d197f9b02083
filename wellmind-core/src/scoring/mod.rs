//! Text-risk scoring.
//!
//! A [`RiskScorer`] turns free-text survey answers into a risk score and
//! label. Scoring is load-bearing: failures are returned to the caller and
//! never replaced by a made-up score.

mod heuristic;
mod http;

pub use heuristic::HeuristicScorer;
pub use http::HttpRiskScorer;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{RiskLabel, RiskScore, SurveyResponses};

/// Result of scoring one set of survey answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub risk: RiskScore,
    pub label: RiskLabel,
}

impl ScoreResult {
    /// Score with the label derived from the score's band.
    #[must_use]
    pub fn from_score(risk: RiskScore) -> Self {
        Self {
            risk,
            label: RiskLabel::from_score(risk),
        }
    }
}

/// Errors that can occur while scoring.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Request could not be sent or the reply could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// Scoring service answered with a non-success status.
    #[error("scoring service returned status {0}")]
    Status(u16),

    /// Reply was well-formed JSON but not a usable score.
    #[error("invalid scoring response: {0}")]
    InvalidResponse(String),

    /// Scoring did not finish in time.
    #[error("scoring timed out after {0:?}")]
    Timeout(Duration),
}

/// Scores survey answers for burnout risk.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Score the answers.
    async fn score(&self, responses: &SurveyResponses) -> Result<ScoreResult, ScoringError>;
}
