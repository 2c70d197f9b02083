//! Employee records and survey submissions.

use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, RiskLabel, RiskScore, ValidationError};

/// Department assigned when a survey omits one.
pub const DEFAULT_DEPARTMENT: &str = "General";

/// A surveyed employee. Email is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub email: String,
}

/// Validated fields for creating an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub department: String,
    pub email: String,
}

impl NewEmployee {
    /// Validate a survey submission.
    ///
    /// Name and email are trimmed and must be non-empty; the email must
    /// contain `@`. A missing or blank department becomes
    /// [`DEFAULT_DEPARTMENT`].
    pub fn new(
        name: impl AsRef<str>,
        department: Option<&str>,
        email: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValidationError::new("name must not be empty"));
        }

        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(ValidationError::new("email must not be empty"));
        }
        if !email.contains('@') {
            return Err(ValidationError::new(format!("invalid email: {}", email)));
        }

        let department = department
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DEPARTMENT);

        Ok(Self {
            name: name.to_string(),
            department: department.to_string(),
            email: email.to_string(),
        })
    }
}

/// An employee joined with their most recent assessment, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOverview {
    pub employee: Employee,
    pub latest_risk: Option<RiskScore>,
    pub latest_label: Option<RiskLabel>,
}
