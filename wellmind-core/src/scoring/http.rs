//! Remote AI scoring service client.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wellmind_core::scoring::HttpRiskScorer;
//!
//! let scorer = HttpRiskScorer::new("http://scorer.internal/v1/burnout", None, Duration::from_secs(10))?;
//! let result = scorer.score(&responses).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RiskScorer, ScoreResult, ScoringError};
use crate::types::{RiskLabel, RiskScore, SurveyResponses};

/// Request body sent to the scoring service.
#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    responses: &'a SurveyResponses,
}

/// Reply from the scoring service.
#[derive(Debug, Deserialize)]
struct ScoreReply {
    #[serde(alias = "score", alias = "risk_score")]
    risk: i64,
    #[serde(default)]
    label: Option<String>,
}

impl ScoreReply {
    fn into_result(self) -> Result<ScoreResult, ScoringError> {
        let risk = RiskScore::new(self.risk).ok_or_else(|| {
            ScoringError::InvalidResponse(format!("risk {} outside 0-100", self.risk))
        })?;

        let label = match self.label.as_deref() {
            Some(raw) => RiskLabel::parse(raw)
                .ok_or_else(|| ScoringError::InvalidResponse(format!("unknown label: {}", raw)))?,
            None => RiskLabel::from_score(risk),
        };

        Ok(ScoreResult { risk, label })
    }
}

/// Scores answers by POSTing them to an external AI scoring endpoint.
pub struct HttpRiskScorer {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpRiskScorer {
    /// Create a scorer for `endpoint`, bounding every request by `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringError::Request(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }

    /// Get the endpoint this scorer posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RiskScorer for HttpRiskScorer {
    fn name(&self) -> &str {
        "http"
    }

    async fn score(&self, responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ScoreRequest { responses });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScoringError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoringError::Status(response.status().as_u16()));
        }

        let reply: ScoreReply = response
            .json()
            .await
            .map_err(|e| ScoringError::InvalidResponse(e.to_string()))?;
        debug!(risk = reply.risk, label = ?reply.label, "scoring service replied");

        reply.into_result()
    }
}
