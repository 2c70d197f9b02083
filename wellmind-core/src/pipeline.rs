//! Assessment pipeline.
//!
//! [`AssessmentPipeline`] runs one analysis request end to end:
//!
//! 1. check the employee exists
//! 2. score the answers (failure is fatal)
//! 3. create the assessment as `pending` (failure is fatal)
//! 4. anchor the record on the ledger (never fails; may be simulated)
//! 5. trigger the workflow engine (failure is recorded as `failed`)
//!
//! Steps 4 and 5 are best-effort side channels: their outcome is visible in
//! the stored record and in the response, but they never turn a scored
//! assessment into an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::assessment::{Assessment, AssessmentFilter, AssessmentSnapshot, WorkflowStatus};
use crate::employee::{Employee, EmployeeOverview, NewEmployee};
use crate::ledger::LedgerAnchor;
use crate::scoring::{RiskScorer, ScoringError};
use crate::storage::{self, RecordStore};
use crate::types::{
    AssessmentId, EmployeeId, RiskLabel, RiskScore, SurveyResponses, ValidationError,
};
use crate::workflow::{TriggerError, WorkflowTrigger};

/// Default bound on each external call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Assessments with a risk score above this are flagged on the dashboard.
pub const FLAGGED_RISK_THRESHOLD: u8 = 60;

/// Number of assessments listed on the dashboard.
pub const RECENT_RESULTS_LIMIT: u32 = 50;

/// Errors surfaced to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    #[error("assessment not found: {0}")]
    AssessmentNotFound(AssessmentId),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("store error: {0}")]
    Store(#[from] storage::Error),
}

/// Pipeline tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bound on each scorer and workflow call.
    pub call_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// One analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub responses: SurveyResponses,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub assessment_id: AssessmentId,
    pub risk: RiskScore,
    pub label: RiskLabel,
    pub ledger_txid: String,
    /// True when the ledger id was derived locally.
    pub ledger_simulated: bool,
    pub workflow_status: WorkflowStatus,
}

/// What a workflow callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Status overwritten.
    Applied,
    /// No assessment with that id; nothing changed.
    UnknownAssessment,
}

/// Aggregates shown on the HR dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub flagged_employees: u64,
    /// Mean risk score rounded to one decimal, 0 when there are no assessments.
    pub average_risk: f64,
    pub ledger_verified: u64,
    pub recent_results: Vec<AssessmentSnapshot>,
}

/// Sequences scorer, store, ledger anchor and workflow trigger.
pub struct AssessmentPipeline {
    store: Arc<dyn RecordStore>,
    scorer: Arc<dyn RiskScorer>,
    anchor: LedgerAnchor,
    trigger: Arc<dyn WorkflowTrigger>,
    config: PipelineConfig,
}

impl AssessmentPipeline {
    /// Create a new pipeline.
    pub fn new(
        store: Arc<dyn RecordStore>,
        scorer: Arc<dyn RiskScorer>,
        anchor: LedgerAnchor,
        trigger: Arc<dyn WorkflowTrigger>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            scorer,
            anchor,
            trigger,
            config,
        }
    }

    /// The record store this pipeline writes to.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// True when ledger ids are simulated.
    pub fn ledger_simulated(&self) -> bool {
        self.anchor.is_simulated()
    }

    // === Commands ===

    /// Record a survey submission, creating the employee on first sight of
    /// their email.
    #[instrument(skip(self, employee), fields(email = %employee.email))]
    pub async fn submit_survey(&self, employee: NewEmployee) -> Result<Employee, PipelineError> {
        let employee = self.store.upsert_employee(&employee).await?;
        debug!(employee_id = %employee.id, "survey recorded");
        Ok(employee)
    }

    /// Run the full analysis pipeline for one request.
    #[instrument(
        skip(self, request),
        fields(employee_id = %request.employee_id, assessment_id = tracing::field::Empty)
    )]
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisOutcome, PipelineError> {
        let AnalyzeRequest {
            employee_id,
            responses,
        } = request;

        if self.store.get_employee(employee_id).await?.is_none() {
            return Err(PipelineError::EmployeeNotFound(employee_id));
        }

        let score = match tokio::time::timeout(
            self.config.call_timeout,
            self.scorer.score(&responses),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(ScoringError::Timeout(self.config.call_timeout).into()),
        };
        debug!(scorer = self.scorer.name(), risk = %score.risk, label = %score.label, "scored answers");

        let mut assessment = self
            .store
            .create_assessment(employee_id, score.risk, score.label)
            .await
            .map_err(|e| match e {
                storage::Error::EmployeeNotFound(id) => PipelineError::EmployeeNotFound(id),
                other => PipelineError::Store(other),
            })?;
        tracing::Span::current().record("assessment_id", assessment.id.0);

        let receipt = self.anchor.anchor(&assessment.snapshot()).await;
        debug!(
            txid = %receipt.transaction_id,
            content_hash = %receipt.content_hash,
            simulated = receipt.simulated,
            "assessment anchored"
        );
        self.persist_ledger(assessment.id, &receipt.transaction_id).await;
        assessment.ledger_txid = Some(receipt.transaction_id.clone());

        let status = self.run_trigger(&assessment).await;
        self.persist_status(assessment.id, &status).await;

        info!(
            assessment_id = %assessment.id,
            risk = %assessment.risk_score,
            ledger_simulated = receipt.simulated,
            workflow_status = %status,
            "assessment pipeline complete"
        );

        Ok(AnalysisOutcome {
            assessment_id: assessment.id,
            risk: assessment.risk_score,
            label: assessment.label,
            ledger_txid: receipt.transaction_id,
            ledger_simulated: receipt.simulated,
            workflow_status: status,
        })
    }

    /// Apply a status reported by the workflow engine.
    ///
    /// Any non-blank status overwrites the current one exactly as sent. An
    /// unknown id changes nothing and is not an error.
    #[instrument(skip(self))]
    pub async fn apply_workflow_callback(
        &self,
        id: AssessmentId,
        status: &str,
    ) -> Result<CallbackOutcome, PipelineError> {
        if status.trim().is_empty() {
            return Err(ValidationError::new("status must not be empty").into());
        }

        let status = WorkflowStatus::parse(status);
        if self
            .store
            .update_assessment_workflow_status(id, &status)
            .await?
        {
            info!(%id, %status, "workflow status updated by callback");
            Ok(CallbackOutcome::Applied)
        } else {
            warn!(%id, %status, "workflow callback for unknown assessment ignored");
            Ok(CallbackOutcome::UnknownAssessment)
        }
    }

    // === Queries ===

    /// Get one assessment.
    pub async fn get_assessment(&self, id: AssessmentId) -> Result<Assessment, PipelineError> {
        self.store
            .get_assessment(id)
            .await?
            .ok_or(PipelineError::AssessmentNotFound(id))
    }

    /// Dashboard aggregates and the most recent assessments.
    pub async fn dashboard(&self) -> Result<DashboardSummary, PipelineError> {
        let flagged_employees = self
            .store
            .count_assessments(AssessmentFilter::RiskAbove(FLAGGED_RISK_THRESHOLD))
            .await?;
        let ledger_verified = self
            .store
            .count_assessments(AssessmentFilter::Anchored)
            .await?;
        let average_risk = self
            .store
            .average_risk_score()
            .await?
            .map(round_one_decimal)
            .unwrap_or(0.0);
        let recent_results = self
            .store
            .list_recent_assessments(RECENT_RESULTS_LIMIT)
            .await?
            .iter()
            .map(Assessment::snapshot)
            .collect();

        Ok(DashboardSummary {
            flagged_employees,
            average_risk,
            ledger_verified,
            recent_results,
        })
    }

    /// Every employee with their latest assessment.
    pub async fn employees(&self) -> Result<Vec<EmployeeOverview>, PipelineError> {
        Ok(self.store.list_employees_with_latest_assessment().await?)
    }

    // === Steps ===

    async fn run_trigger(&self, assessment: &Assessment) -> WorkflowStatus {
        let outcome = match tokio::time::timeout(
            self.config.call_timeout,
            self.trigger.trigger(&assessment.snapshot()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TriggerError::Timeout(self.config.call_timeout)),
        };

        match outcome {
            Ok(ack) => {
                debug!(run_id = ?ack.run_id, "workflow triggered");
                WorkflowStatus::Triggered
            }
            Err(e) => {
                warn!(assessment_id = %assessment.id, error = %e, "workflow trigger failed");
                WorkflowStatus::Failed
            }
        }
    }

    async fn persist_ledger(&self, id: AssessmentId, txid: &str) {
        if let Err(e) = self.store.update_assessment_ledger(id, txid).await {
            warn!(%id, error = %e, "failed to persist ledger id");
        }
    }

    async fn persist_status(&self, id: AssessmentId, status: &WorkflowStatus) {
        if let Err(e) = self
            .store
            .update_assessment_workflow_status(id, status)
            .await
        {
            warn!(%id, error = %e, "failed to persist workflow status");
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ledger::{AnchorError, ContentHash, LedgerClient};
    use crate::scoring::ScoreResult;
    use crate::storage::TursoRecordStore;
    use crate::workflow::WorkflowAck;

    /// Scorer returning a fixed result.
    struct FixedScorer(ScoreResult);

    #[async_trait]
    impl RiskScorer for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, _responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
            Ok(self.0)
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl RiskScorer for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn score(&self, _responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
            Err(ScoringError::Status(500))
        }
    }

    struct HangingScorer;

    #[async_trait]
    impl RiskScorer for HangingScorer {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn score(&self, _responses: &SurveyResponses) -> Result<ScoreResult, ScoringError> {
            std::future::pending().await
        }
    }

    /// Trigger that records what it was sent.
    #[derive(Default)]
    struct RecordingTrigger {
        fail: bool,
        seen: Mutex<Vec<AssessmentSnapshot>>,
    }

    #[async_trait]
    impl WorkflowTrigger for RecordingTrigger {
        async fn trigger(
            &self,
            snapshot: &AssessmentSnapshot,
        ) -> Result<WorkflowAck, TriggerError> {
            self.seen.lock().unwrap().push(snapshot.clone());
            if self.fail {
                Err(TriggerError::Status(503))
            } else {
                Ok(WorkflowAck {
                    run_id: Some("run-1".to_string()),
                })
            }
        }
    }

    struct HangingTrigger;

    #[async_trait]
    impl WorkflowTrigger for HangingTrigger {
        async fn trigger(
            &self,
            _snapshot: &AssessmentSnapshot,
        ) -> Result<WorkflowAck, TriggerError> {
            std::future::pending().await
        }
    }

    struct BrokenLedger;

    #[async_trait]
    impl LedgerClient for BrokenLedger {
        async fn submit(&self, _hash: &ContentHash) -> Result<String, AnchorError> {
            Err(AnchorError::Request("connection refused".to_string()))
        }
    }

    fn high_72() -> ScoreResult {
        ScoreResult {
            risk: RiskScore::new(72).unwrap(),
            label: RiskLabel::High,
        }
    }

    struct Harness {
        pipeline: AssessmentPipeline,
        store: Arc<TursoRecordStore>,
        trigger: Arc<RecordingTrigger>,
    }

    async fn harness(scorer: Arc<dyn RiskScorer>, trigger_fails: bool) -> Harness {
        let store = Arc::new(TursoRecordStore::new_memory().await.unwrap());
        let trigger = Arc::new(RecordingTrigger {
            fail: trigger_fails,
            ..Default::default()
        });
        let pipeline = AssessmentPipeline::new(
            store.clone(),
            scorer,
            LedgerAnchor::simulated(),
            trigger.clone(),
            PipelineConfig::default(),
        );
        Harness {
            pipeline,
            store,
            trigger,
        }
    }

    async fn submit(pipeline: &AssessmentPipeline, email: &str) -> Employee {
        pipeline
            .submit_survey(NewEmployee::new("A", None, email).unwrap())
            .await
            .unwrap()
    }

    fn request(employee_id: EmployeeId) -> AnalyzeRequest {
        AnalyzeRequest {
            employee_id,
            responses: SurveyResponses::new().with_answer("q1", "tired"),
        }
    }

    #[tokio::test]
    async fn analyze_runs_all_steps_and_persists_outcome() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;
        assert_eq!(employee.id, EmployeeId(1));

        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();

        assert_eq!(outcome.risk.value(), 72);
        assert_eq!(outcome.label, RiskLabel::High);
        assert!(outcome.ledger_simulated);
        assert!(outcome.ledger_txid.starts_with("0.0.1-"));
        assert_eq!(outcome.ledger_txid.len(), "0.0.1-".len() + 8);
        assert_eq!(outcome.workflow_status, WorkflowStatus::Triggered);

        let stored = h.store.get_assessment(outcome.assessment_id).await.unwrap().unwrap();
        assert_eq!(stored.ledger_txid.as_deref(), Some(outcome.ledger_txid.as_str()));
        assert_eq!(stored.workflow_status, WorkflowStatus::Triggered);
    }

    #[tokio::test]
    async fn ledger_id_is_hash_of_pending_snapshot() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;

        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();

        let mut pending = h.store.get_assessment(outcome.assessment_id).await.unwrap().unwrap();
        pending.ledger_txid = None;
        pending.workflow_status = WorkflowStatus::Pending;
        let expected = LedgerAnchor::simulated().anchor(&pending.snapshot()).await;
        assert_eq!(outcome.ledger_txid, expected.transaction_id);
    }

    #[tokio::test]
    async fn trigger_receives_ledger_stamped_snapshot() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;

        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();

        let seen = h.trigger.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, outcome.assessment_id);
        assert_eq!(seen[0].ledger_txid.as_deref(), Some(outcome.ledger_txid.as_str()));
        assert_eq!(seen[0].workflow_status, WorkflowStatus::Pending);
        assert_eq!(seen[0].employee_name, "A");
    }

    #[tokio::test]
    async fn trigger_failure_is_recorded_not_raised() {
        let h = harness(Arc::new(FixedScorer(high_72())), true).await;
        let employee = submit(&h.pipeline, "a@x.com").await;

        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();

        assert_eq!(outcome.workflow_status, WorkflowStatus::Failed);
        let stored = h.store.get_assessment(outcome.assessment_id).await.unwrap().unwrap();
        assert_eq!(stored.workflow_status, WorkflowStatus::Failed);
        assert!(stored.ledger_txid.is_some());
    }

    #[tokio::test]
    async fn trigger_timeout_is_recorded_as_failed() {
        let store = Arc::new(TursoRecordStore::new_memory().await.unwrap());
        let pipeline = AssessmentPipeline::new(
            store.clone(),
            Arc::new(FixedScorer(high_72())),
            LedgerAnchor::simulated(),
            Arc::new(HangingTrigger),
            PipelineConfig {
                call_timeout: Duration::from_millis(20),
            },
        );
        let employee = submit(&pipeline, "a@x.com").await;

        let outcome = pipeline.analyze(request(employee.id)).await.unwrap();

        assert_eq!(outcome.workflow_status, WorkflowStatus::Failed);
    }

    #[tokio::test]
    async fn ledger_failure_still_yields_simulated_id() {
        let store = Arc::new(TursoRecordStore::new_memory().await.unwrap());
        let pipeline = AssessmentPipeline::new(
            store.clone(),
            Arc::new(FixedScorer(high_72())),
            LedgerAnchor::with_client(Arc::new(BrokenLedger), Duration::from_secs(1)),
            Arc::new(RecordingTrigger::default()),
            PipelineConfig::default(),
        );
        let employee = submit(&pipeline, "a@x.com").await;

        let outcome = pipeline.analyze(request(employee.id)).await.unwrap();

        assert!(!pipeline.ledger_simulated());
        assert!(outcome.ledger_simulated);
        assert!(outcome.ledger_txid.starts_with("0.0.1-"));
        assert_eq!(outcome.workflow_status, WorkflowStatus::Triggered);
    }

    #[tokio::test]
    async fn unknown_employee_halts_before_scoring() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;

        let err = h.pipeline.analyze(request(EmployeeId(42))).await.unwrap_err();

        assert!(matches!(err, PipelineError::EmployeeNotFound(EmployeeId(42))));
        assert_eq!(h.store.count_assessments(AssessmentFilter::All).await.unwrap(), 0);
        assert!(h.trigger.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scoring_failure_creates_no_assessment() {
        let h = harness(Arc::new(FailingScorer), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;

        let err = h.pipeline.analyze(request(employee.id)).await.unwrap_err();

        assert!(matches!(err, PipelineError::Scoring(ScoringError::Status(500))));
        assert_eq!(h.store.count_assessments(AssessmentFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scoring_timeout_is_a_scoring_failure() {
        let store = Arc::new(TursoRecordStore::new_memory().await.unwrap());
        let pipeline = AssessmentPipeline::new(
            store.clone(),
            Arc::new(HangingScorer),
            LedgerAnchor::simulated(),
            Arc::new(RecordingTrigger::default()),
            PipelineConfig {
                call_timeout: Duration::from_millis(20),
            },
        );
        let employee = submit(&pipeline, "a@x.com").await;

        let err = pipeline.analyze(request(employee.id)).await.unwrap_err();

        assert!(matches!(err, PipelineError::Scoring(ScoringError::Timeout(_))));
        assert_eq!(store.count_assessments(AssessmentFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn callback_overwrites_status_unconditionally() {
        let h = harness(Arc::new(FixedScorer(high_72())), true).await;
        let employee = submit(&h.pipeline, "a@x.com").await;
        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();
        assert_eq!(outcome.workflow_status, WorkflowStatus::Failed);

        let applied = h
            .pipeline
            .apply_workflow_callback(outcome.assessment_id, "hr_contacted")
            .await
            .unwrap();
        assert_eq!(applied, CallbackOutcome::Applied);

        let again = h
            .pipeline
            .apply_workflow_callback(outcome.assessment_id, "pending")
            .await
            .unwrap();
        assert_eq!(again, CallbackOutcome::Applied);

        let stored = h.pipeline.get_assessment(outcome.assessment_id).await.unwrap();
        assert_eq!(stored.workflow_status, WorkflowStatus::Pending);
    }

    #[tokio::test]
    async fn callback_status_is_stored_as_sent() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;
        let outcome = h.pipeline.analyze(request(employee.id)).await.unwrap();

        h.pipeline
            .apply_workflow_callback(outcome.assessment_id, "  HR Contacted ")
            .await
            .unwrap();

        let stored = h.pipeline.get_assessment(outcome.assessment_id).await.unwrap();
        assert_eq!(
            stored.workflow_status,
            WorkflowStatus::External("  HR Contacted ".to_string())
        );
        assert_eq!(stored.workflow_status.to_string(), "  HR Contacted ");
    }

    #[tokio::test]
    async fn callback_for_unknown_assessment_is_a_noop() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;

        let outcome = h
            .pipeline
            .apply_workflow_callback(AssessmentId(404), "completed")
            .await
            .unwrap();

        assert_eq!(outcome, CallbackOutcome::UnknownAssessment);
        assert_eq!(h.store.count_assessments(AssessmentFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn callback_rejects_blank_status() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;

        let err = h
            .pipeline
            .apply_workflow_callback(AssessmentId(1), "  ")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn dashboard_is_zeroed_when_empty() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;

        let summary = h.pipeline.dashboard().await.unwrap();

        assert_eq!(summary.flagged_employees, 0);
        assert_eq!(summary.average_risk, 0.0);
        assert_eq!(summary.ledger_verified, 0);
        assert!(summary.recent_results.is_empty());
    }

    #[tokio::test]
    async fn dashboard_aggregates_assessments() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;

        h.pipeline.analyze(request(employee.id)).await.unwrap();
        h.store
            .create_assessment(employee.id, RiskScore::new(41).unwrap(), RiskLabel::Medium)
            .await
            .unwrap();
        h.store
            .create_assessment(employee.id, RiskScore::new(60).unwrap(), RiskLabel::Medium)
            .await
            .unwrap();

        let summary = h.pipeline.dashboard().await.unwrap();

        // (72 + 41 + 60) / 3 = 57.666..
        assert_eq!(summary.average_risk, 57.7);
        assert_eq!(summary.flagged_employees, 1);
        assert_eq!(summary.ledger_verified, 1);
        assert_eq!(summary.recent_results.len(), 3);
        assert_eq!(summary.recent_results[0].risk_score.value(), 60);
    }

    #[tokio::test]
    async fn employees_show_latest_assessment() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;
        let employee = submit(&h.pipeline, "a@x.com").await;
        submit(&h.pipeline, "b@x.com").await;
        h.pipeline.analyze(request(employee.id)).await.unwrap();

        let employees = h.pipeline.employees().await.unwrap();

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].latest_risk.map(RiskScore::value), Some(72));
        assert!(employees[1].latest_label.is_none());
    }

    #[tokio::test]
    async fn get_assessment_reports_missing_id() {
        let h = harness(Arc::new(FixedScorer(high_72())), false).await;

        let err = h.pipeline.get_assessment(AssessmentId(3)).await.unwrap_err();

        assert!(matches!(err, PipelineError::AssessmentNotFound(AssessmentId(3))));
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_one_decimal(57.666), 57.7);
        assert_eq!(round_one_decimal(12.04), 12.0);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }
}
