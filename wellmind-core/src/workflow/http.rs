//! HTTP client for the workflow orchestration engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{TriggerError, WorkflowAck, WorkflowTrigger};
use crate::assessment::AssessmentSnapshot;

/// Optional reply body from the workflow engine.
#[derive(Debug, Default, Deserialize)]
struct TriggerReply {
    #[serde(default, alias = "id", alias = "workflow_id")]
    run_id: Option<String>,
}

/// Starts workflow runs by POSTing the assessment snapshot to the engine.
pub struct HttpWorkflowTrigger {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpWorkflowTrigger {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TriggerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriggerError::Request(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl WorkflowTrigger for HttpWorkflowTrigger {
    async fn trigger(&self, snapshot: &AssessmentSnapshot) -> Result<WorkflowAck, TriggerError> {
        let mut request = self.client.post(&self.endpoint).json(snapshot);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TriggerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TriggerError::Status(response.status().as_u16()));
        }

        // The engine may answer with an empty or non-JSON body.
        let body = response
            .text()
            .await
            .map_err(|e| TriggerError::Request(e.to_string()))?;
        let reply: TriggerReply = serde_json::from_str(&body).unwrap_or_default();
        debug!(run_id = ?reply.run_id, "workflow engine accepted trigger");

        Ok(WorkflowAck {
            run_id: reply.run_id,
        })
    }
}
