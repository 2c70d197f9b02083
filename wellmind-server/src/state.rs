//! Shared application state for the wellmind server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use wellmind_core::scoring::HeuristicScorer;
use wellmind_core::workflow::UnconfiguredTrigger;
use wellmind_core::{AssessmentPipeline, LedgerAnchor, PipelineConfig, TursoRecordStore};

use crate::ServerError;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Assessment pipeline and its record store
    pub pipeline: Arc<AssessmentPipeline>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around a configured pipeline
    pub fn new(pipeline: AssessmentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            started_at: Utc::now(),
        }
    }

    /// In-memory store, heuristic scorer, simulated ledger and no workflow
    /// engine.
    pub async fn new_for_testing() -> Result<Self, ServerError> {
        let store = TursoRecordStore::new_memory().await?;
        let pipeline = AssessmentPipeline::new(
            Arc::new(store),
            Arc::new(HeuristicScorer::new()),
            LedgerAnchor::simulated(),
            Arc::new(UnconfiguredTrigger),
            PipelineConfig::default(),
        );
        Ok(Self::new(pipeline))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
