//! Burnout risk assessment core for WellMind.
//!
//! This crate holds everything the HTTP surface drives:
//!
//! - **Storage** ([`RecordStore`]) persists employees and assessments
//! - **Scoring** ([`RiskScorer`]) turns survey answers into a risk score
//! - **Ledger** ([`LedgerAnchor`]) anchors a content hash of each assessment,
//!   falling back to a deterministic simulated id
//! - **Workflow** ([`WorkflowTrigger`]) notifies the HR workflow engine
//! - **Pipeline** ([`AssessmentPipeline`]) sequences the above for one request

mod assessment;
mod employee;
pub mod ledger;
mod pipeline;
pub mod scoring;
pub mod storage;
mod types;
pub mod workflow;

// Record types
pub use assessment::{
    Assessment, AssessmentFilter, AssessmentSnapshot, UNKNOWN_EMPLOYEE, WorkflowStatus,
};
pub use employee::{DEFAULT_DEPARTMENT, Employee, EmployeeOverview, NewEmployee};

// Pipeline
pub use pipeline::{
    AnalysisOutcome, AnalyzeRequest, AssessmentPipeline, CallbackOutcome, DEFAULT_CALL_TIMEOUT,
    DashboardSummary, FLAGGED_RISK_THRESHOLD, PipelineConfig, PipelineError,
    RECENT_RESULTS_LIMIT,
};

// Adapters
pub use ledger::{AnchorReceipt, LedgerAnchor, LedgerClient};
pub use scoring::{RiskScorer, ScoreResult};
pub use workflow::WorkflowTrigger;

// Value types
pub use types::{
    AssessmentId, EmployeeId, RiskLabel, RiskScore, SurveyResponses, ValidationError,
    format_timestamp,
};

// Storage
pub use storage::{RecordStore, TursoRecordStore};
