//! Record store for employees and assessments.
//!
//! [`RecordStore`] is the only persistence seam the pipeline and HTTP layer
//! see. Every method is a single atomic statement (or a retrying sequence of
//! them, for [`RecordStore::upsert_employee`]); nothing spans a whole
//! pipeline run.
//!
//! The Turso implementation stores data in libSQL and can run against a
//! local file, a remote Turso database, or an in-memory database for tests.

mod error;
mod turso;

pub use error::{Error, Result};
pub use turso::TursoRecordStore;

use async_trait::async_trait;

use crate::assessment::{Assessment, AssessmentFilter, WorkflowStatus};
use crate::employee::{Employee, EmployeeOverview, NewEmployee};
use crate::types::{AssessmentId, EmployeeId, RiskLabel, RiskScore};

/// Durable mapping from ids to employee and assessment records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new employee.
    ///
    /// Fails with [`Error::DuplicateKey`] if the email is already taken.
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee>;

    /// Look up an employee by id.
    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>>;

    /// Look up an employee by email.
    async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>>;

    /// Return the employee with this email, creating it if absent.
    ///
    /// A concurrent insert of the same email loses the unique-key race and
    /// re-reads the winner's row, so exactly one employee ever exists per
    /// email.
    async fn upsert_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        if let Some(existing) = self.find_employee_by_email(&employee.email).await? {
            return Ok(existing);
        }

        match self.create_employee(employee).await {
            Ok(created) => Ok(created),
            Err(Error::DuplicateKey(_)) => self
                .find_employee_by_email(&employee.email)
                .await?
                .ok_or_else(|| {
                    Error::InvalidData(format!(
                        "email {} reported duplicate but no row found",
                        employee.email
                    ))
                }),
            Err(e) => Err(e),
        }
    }

    /// Insert an assessment with status `pending` and no ledger id.
    ///
    /// Fails with [`Error::EmployeeNotFound`] if the employee does not exist.
    async fn create_assessment(
        &self,
        employee_id: EmployeeId,
        risk_score: RiskScore,
        label: RiskLabel,
    ) -> Result<Assessment>;

    /// Set the ledger transaction id. Returns `false` if no such assessment.
    async fn update_assessment_ledger(&self, id: AssessmentId, txid: &str) -> Result<bool>;

    /// Set the workflow status. Returns `false` if no such assessment.
    async fn update_assessment_workflow_status(
        &self,
        id: AssessmentId,
        status: &WorkflowStatus,
    ) -> Result<bool>;

    /// Get an assessment by id.
    async fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>>;

    /// Most recent assessments first, at most `limit`.
    async fn list_recent_assessments(&self, limit: u32) -> Result<Vec<Assessment>>;

    /// Count assessments matching the filter.
    async fn count_assessments(&self, filter: AssessmentFilter) -> Result<u64>;

    /// Mean risk score over all assessments, `None` when there are none.
    async fn average_risk_score(&self) -> Result<Option<f64>>;

    /// Every employee with their most recent assessment, ordered by id.
    async fn list_employees_with_latest_assessment(&self) -> Result<Vec<EmployeeOverview>>;
}
