//! Burnout assessment records.
//!
//! An assessment is created once per analysis request, stamped with a ledger
//! transaction id by the pipeline, and then has its workflow status moved by
//! the pipeline and, later, by the workflow engine's callback.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AssessmentId, EmployeeId, RiskLabel, RiskScore, format_timestamp};

/// Name reported when an assessment's employee row cannot be joined.
pub const UNKNOWN_EMPLOYEE: &str = "Unknown";

/// Lifecycle tag for the external workflow run of an assessment.
///
/// `Pending` on creation, `Triggered` or `Failed` after the pipeline's
/// trigger step, then any string the workflow engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Pending,
    Triggered,
    Failed,
    /// Status reported by the workflow engine, kept verbatim.
    External(String),
}

impl WorkflowStatus {
    /// Convert to database string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Triggered => "triggered",
            Self::Failed => "failed",
            Self::External(status) => status,
        }
    }

    /// Parse from database or callback string. Never fails.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "triggered" => Self::Triggered,
            "failed" => Self::Failed,
            other => Self::External(other.to_string()),
        }
    }
}

impl From<String> for WorkflowStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "triggered" => Self::Triggered,
            "failed" => Self::Failed,
            _ => Self::External(s),
        }
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::External(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted burnout assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub employee_id: EmployeeId,
    /// Joined from the employee row; `None` if it could not be joined.
    pub employee_name: Option<String>,
    pub risk_score: RiskScore,
    pub label: RiskLabel,
    pub created_at: DateTime<Utc>,
    pub ledger_txid: Option<String>,
    pub workflow_status: WorkflowStatus,
}

impl Assessment {
    /// Serializable view handed to the ledger, the workflow engine and the
    /// dashboard.
    #[must_use]
    pub fn snapshot(&self) -> AssessmentSnapshot {
        AssessmentSnapshot {
            id: self.id,
            employee_id: self.employee_id,
            employee_name: self
                .employee_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_EMPLOYEE.to_string()),
            risk_score: self.risk_score,
            label: self.label,
            timestamp: format_timestamp(self.created_at),
            ledger_txid: self.ledger_txid.clone(),
            workflow_status: self.workflow_status.clone(),
        }
    }
}

/// Flat snapshot of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSnapshot {
    pub id: AssessmentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub risk_score: RiskScore,
    pub label: RiskLabel,
    pub timestamp: String,
    pub ledger_txid: Option<String>,
    pub workflow_status: WorkflowStatus,
}

impl AssessmentSnapshot {
    /// JSON with keys in sorted order.
    ///
    /// The same logical record always yields the same bytes, which is what
    /// the ledger hash is computed over.
    #[must_use]
    pub fn canonical_json(&self) -> String {
        let mut fields: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        fields.insert("id", self.id.0.into());
        fields.insert("employee_id", self.employee_id.0.into());
        fields.insert("employee_name", self.employee_name.clone().into());
        fields.insert("risk_score", i64::from(self.risk_score).into());
        fields.insert("label", self.label.as_str().into());
        fields.insert("timestamp", self.timestamp.clone().into());
        fields.insert(
            "ledger_txid",
            self.ledger_txid
                .clone()
                .map_or(serde_json::Value::Null, serde_json::Value::from),
        );
        fields.insert("workflow_status", self.workflow_status.as_str().into());

        // Serializing a map of plain JSON values cannot fail.
        serde_json::to_string(&fields).unwrap_or_default()
    }
}

/// Predicate for [`RecordStore::count_assessments`](crate::storage::RecordStore::count_assessments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentFilter {
    /// Every assessment.
    All,
    /// Risk score strictly greater than the threshold.
    RiskAbove(u8),
    /// Ledger transaction id is set.
    Anchored,
    /// Workflow status equals the given status.
    WorkflowStatus(WorkflowStatus),
}
