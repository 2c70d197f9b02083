//! Shared test utilities for wellmind-server integration tests

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use wellmind_core::scoring::{ScoreResult, ScoringError};
use wellmind_core::workflow::{TriggerError, WorkflowAck};
use wellmind_core::{
    AssessmentPipeline, AssessmentSnapshot, LedgerAnchor, PipelineConfig, RiskLabel, RiskScore,
    RiskScorer, SurveyResponses, TursoRecordStore, WorkflowTrigger,
};
use wellmind_server::{AppState, ServerConfig, WellmindServer};

/// Scorer that always answers with the same score
pub struct StubScorer(pub ScoreResult);

impl StubScorer {
    #[allow(dead_code)]
    pub fn high_72() -> Self {
        Self(ScoreResult {
            risk: RiskScore::new(72).unwrap(),
            label: RiskLabel::High,
        })
    }
}

#[async_trait]
impl RiskScorer for StubScorer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn score(&self, _responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
        Ok(self.0)
    }
}

/// Scorer that is always down
pub struct DownScorer;

#[async_trait]
impl RiskScorer for DownScorer {
    fn name(&self) -> &str {
        "down"
    }

    async fn score(&self, _responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
        Err(ScoringError::Status(503))
    }
}

/// Workflow engine that accepts or refuses every trigger
pub struct StubTrigger {
    pub accept: bool,
}

#[async_trait]
impl WorkflowTrigger for StubTrigger {
    async fn trigger(&self, _snapshot: &AssessmentSnapshot) -> Result<WorkflowAck, TriggerError> {
        if self.accept {
            Ok(WorkflowAck::default())
        } else {
            Err(TriggerError::Status(500))
        }
    }
}

/// Creates a test server with the given scorer and workflow behaviour,
/// returns state and address
#[allow(dead_code)]
pub async fn create_test_server(
    scorer: Arc<dyn RiskScorer>,
    workflow_accepts: bool,
) -> (Arc<AppState>, SocketAddr) {
    let store = TursoRecordStore::new_memory().await.unwrap();
    let pipeline = AssessmentPipeline::new(
        Arc::new(store),
        scorer,
        LedgerAnchor::simulated(),
        Arc::new(StubTrigger {
            accept: workflow_accepts,
        }),
        PipelineConfig::default(),
    );
    let state = Arc::new(AppState::new(pipeline));

    let server = WellmindServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: WellmindServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}

/// Base URL for an API path on a spawned server
#[allow(dead_code)]
pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}
