//! Starting external workflow runs for new assessments.
//!
//! A [`WorkflowTrigger`] may fail; deciding what a failure means for the
//! assessment is the pipeline's job.

mod http;

pub use http::HttpWorkflowTrigger;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::AssessmentSnapshot;

/// Acknowledgement from the workflow engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAck {
    /// Engine-side run identifier, when the engine reports one.
    pub run_id: Option<String>,
}

/// Errors from starting a workflow run.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// No workflow engine is configured.
    #[error("workflow engine not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Request(String),

    #[error("workflow engine returned status {0}")]
    Status(u16),

    #[error("workflow trigger timed out after {0:?}")]
    Timeout(Duration),
}

/// Starts a workflow run for an assessment.
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    async fn trigger(&self, snapshot: &AssessmentSnapshot) -> Result<WorkflowAck, TriggerError>;
}

/// Trigger used when no workflow engine is configured. Always fails, so
/// records show `failed` rather than pretending a run started.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredTrigger;

#[async_trait]
impl WorkflowTrigger for UnconfiguredTrigger {
    async fn trigger(&self, _snapshot: &AssessmentSnapshot) -> Result<WorkflowAck, TriggerError> {
        Err(TriggerError::NotConfigured)
    }
}
