//! Turso/libSQL implementation of the record store.
//!
//! This module provides persistent storage using Turso (libSQL).
//! It can connect to:
//! - Remote Turso database (cloud)
//! - Local embedded SQLite file
//! - In-memory database (tests)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params::IntoParams;
use libsql::{Builder, Connection, Database};
use tracing::{debug, instrument};

use super::{Error, RecordStore, Result};
use crate::assessment::{Assessment, AssessmentFilter, WorkflowStatus};
use crate::employee::{Employee, EmployeeOverview, NewEmployee};
use crate::types::{AssessmentId, EmployeeId, RiskLabel, RiskScore, format_timestamp};

/// SQL schema for the employees table.
const SCHEMA_EMPLOYEES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    department TEXT,
    email TEXT NOT NULL UNIQUE
)
"#;

/// SQL schema for the assessments table.
const SCHEMA_ASSESSMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES employees(id),
    risk_score INTEGER NOT NULL CHECK (risk_score BETWEEN 0 AND 100),
    label TEXT NOT NULL,
    created_at TEXT NOT NULL,
    ledger_txid TEXT,
    workflow_status TEXT NOT NULL DEFAULT 'pending'
)
"#;

/// SQL index for per-employee "latest assessment" lookups.
const INDEX_ASSESSMENTS_EMPLOYEE: &str = r#"
CREATE INDEX IF NOT EXISTS idx_assessments_employee_time
ON assessments(employee_id, created_at)
"#;

/// SQL index for dashboard recency queries.
const INDEX_ASSESSMENTS_CREATED: &str = r#"
CREATE INDEX IF NOT EXISTS idx_assessments_created
ON assessments(created_at)
"#;

const EMPLOYEE_COLUMNS: &str = "id, name, department, email";

const ASSESSMENT_SELECT: &str = "SELECT a.id, a.employee_id, e.name, a.risk_score, a.label, a.created_at, a.ledger_txid, a.workflow_status FROM assessments a LEFT JOIN employees e ON e.id = a.employee_id";

/// Turso-backed record store.
///
/// In-memory databases live only as long as their connection, so a single
/// connection is opened up front and shared by all clones.
#[derive(Clone)]
pub struct TursoRecordStore {
    _db: Arc<Database>,
    conn: Arc<Connection>,
}

impl TursoRecordStore {
    /// Open a store from a connection string.
    ///
    /// `:memory:` opens an in-memory database, `libsql://`, `http://` and
    /// `https://` URLs connect to a remote Turso database with `auth_token`,
    /// anything else is treated as a local file path.
    pub async fn open(url: &str, auth_token: Option<&str>) -> Result<Self> {
        if url == ":memory:" {
            Self::new_memory().await
        } else if is_remote_url(url) {
            Self::new_remote(url, auth_token.unwrap_or_default()).await
        } else {
            Self::new_local(Path::new(url)).await
        }
    }

    /// Create a new store with a local embedded database.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        Self::from_database(db).await
    }

    /// Create a new store connected to a remote Turso database.
    pub async fn new_remote(url: &str, token: &str) -> Result<Self> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;
        Self::from_database(db).await
    }

    /// Create a new in-memory store (for testing).
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db.connect()?;
        let store = Self {
            _db: Arc::new(db),
            conn: Arc::new(conn),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Ensure the database schema exists.
    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute(SCHEMA_EMPLOYEES, ()).await?;
        conn.execute(SCHEMA_ASSESSMENTS, ()).await?;
        conn.execute(INDEX_ASSESSMENTS_EMPLOYEE, ()).await?;
        conn.execute(INDEX_ASSESSMENTS_CREATED, ()).await?;
        Ok(())
    }

    /// Run a `SELECT COUNT(*)` style query.
    async fn count(&self, sql: &str, params: impl IntoParams) -> Result<u64> {
        let mut rows = self.conn().query(sql, params).await?;
        match rows.next().await? {
            Some(row) => {
                let count: i64 = row.get(0)?;
                Ok(count.max(0) as u64)
            }
            None => Ok(0),
        }
    }

    /// Parse an employee from a database row.
    fn parse_employee(row: &libsql::Row) -> Result<Employee> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let department: Option<String> = row.get(2)?;
        let email: String = row.get(3)?;

        Ok(Employee {
            id: EmployeeId(id),
            name,
            department: department.unwrap_or_default(),
            email,
        })
    }

    /// Parse an assessment from a row of [`ASSESSMENT_SELECT`].
    fn parse_assessment(row: &libsql::Row) -> Result<Assessment> {
        let id: i64 = row.get(0)?;
        let employee_id: i64 = row.get(1)?;
        let employee_name: Option<String> = row.get(2)?;
        let risk_score: i64 = row.get(3)?;
        let label_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let ledger_txid: Option<String> = row.get(6)?;
        let status_str: String = row.get(7)?;

        Ok(Assessment {
            id: AssessmentId(id),
            employee_id: EmployeeId(employee_id),
            employee_name,
            risk_score: parse_risk(risk_score)?,
            label: parse_label(&label_str)?,
            created_at: parse_datetime(&created_at_str)?,
            ledger_txid,
            workflow_status: WorkflowStatus::parse(&status_str),
        })
    }
}

#[async_trait]
impl RecordStore for TursoRecordStore {
    #[instrument(skip(self, employee), fields(email = %employee.email), level = "debug")]
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let mut rows = self
            .conn()
            .query(
                "INSERT INTO employees (name, department, email) VALUES (?, ?, ?) RETURNING id",
                libsql::params![
                    employee.name.clone(),
                    employee.department.clone(),
                    employee.email.clone()
                ],
            )
            .await
            .map_err(|e| Error::from_insert(e, &employee.email))?;

        let row = rows
            .next()
            .await
            .map_err(|e| Error::from_insert(e, &employee.email))?
            .ok_or_else(|| Error::InvalidData("insert returned no id".to_string()))?;
        let id: i64 = row.get(0)?;

        debug!(id, "created employee");
        Ok(Employee {
            id: EmployeeId(id),
            name: employee.name.clone(),
            department: employee.department.clone(),
            email: employee.email.clone(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
        let mut rows = self.conn().query(&sql, [id.0]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_employee(&row)?))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE email = ?", EMPLOYEE_COLUMNS);
        let mut rows = self.conn().query(&sql, [email]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_employee(&row)?))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_assessment(
        &self,
        employee_id: EmployeeId,
        risk_score: RiskScore,
        label: RiskLabel,
    ) -> Result<Assessment> {
        // The EXISTS guard makes the foreign-key check and the insert one
        // statement.
        let mut rows = self
            .conn()
            .query(
                "INSERT INTO assessments (employee_id, risk_score, label, created_at, workflow_status) \
                 SELECT ?1, ?2, ?3, ?4, ?5 WHERE EXISTS (SELECT 1 FROM employees WHERE id = ?1) \
                 RETURNING id",
                libsql::params![
                    employee_id.0,
                    i64::from(risk_score),
                    label.as_str(),
                    format_timestamp(Utc::now()),
                    WorkflowStatus::Pending.as_str()
                ],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Err(Error::EmployeeNotFound(employee_id));
        };
        let id = AssessmentId(row.get(0)?);
        drop(rows);
        debug!(%id, "created assessment");

        self.get_assessment(id)
            .await?
            .ok_or_else(|| Error::InvalidData(format!("assessment {} vanished after insert", id)))
    }

    #[instrument(skip(self), level = "debug")]
    async fn update_assessment_ledger(&self, id: AssessmentId, txid: &str) -> Result<bool> {
        let updated = self
            .conn()
            .execute(
                "UPDATE assessments SET ledger_txid = ? WHERE id = ?",
                libsql::params![txid, id.0],
            )
            .await?;
        Ok(updated > 0)
    }

    #[instrument(skip(self), level = "debug")]
    async fn update_assessment_workflow_status(
        &self,
        id: AssessmentId,
        status: &WorkflowStatus,
    ) -> Result<bool> {
        let updated = self
            .conn()
            .execute(
                "UPDATE assessments SET workflow_status = ? WHERE id = ?",
                libsql::params![status.as_str(), id.0],
            )
            .await?;
        Ok(updated > 0)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>> {
        let sql = format!("{} WHERE a.id = ?", ASSESSMENT_SELECT);
        let mut rows = self.conn().query(&sql, [id.0]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_assessment(&row)?))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_recent_assessments(&self, limit: u32) -> Result<Vec<Assessment>> {
        let sql = format!(
            "{} ORDER BY a.created_at DESC, a.id DESC LIMIT ?",
            ASSESSMENT_SELECT
        );
        let mut rows = self.conn().query(&sql, [i64::from(limit)]).await?;

        let mut assessments = Vec::new();
        while let Some(row) = rows.next().await? {
            assessments.push(Self::parse_assessment(&row)?);
        }
        Ok(assessments)
    }

    #[instrument(skip(self), level = "debug")]
    async fn count_assessments(&self, filter: AssessmentFilter) -> Result<u64> {
        match filter {
            AssessmentFilter::All => self.count("SELECT COUNT(*) FROM assessments", ()).await,
            AssessmentFilter::RiskAbove(threshold) => {
                self.count(
                    "SELECT COUNT(*) FROM assessments WHERE risk_score > ?",
                    [i64::from(threshold)],
                )
                .await
            }
            AssessmentFilter::Anchored => {
                self.count(
                    "SELECT COUNT(*) FROM assessments WHERE ledger_txid IS NOT NULL",
                    (),
                )
                .await
            }
            AssessmentFilter::WorkflowStatus(status) => {
                self.count(
                    "SELECT COUNT(*) FROM assessments WHERE workflow_status = ?",
                    [status.as_str()],
                )
                .await
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn average_risk_score(&self) -> Result<Option<f64>> {
        let mut rows = self
            .conn()
            .query("SELECT AVG(risk_score) FROM assessments", ())
            .await?;

        match rows.next().await? {
            Some(row) => Ok(row.get::<Option<f64>>(0)?),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_employees_with_latest_assessment(&self) -> Result<Vec<EmployeeOverview>> {
        let mut rows = self
            .conn()
            .query(
                "SELECT e.id, e.name, e.department, e.email, a.risk_score, a.label \
                 FROM employees e \
                 LEFT JOIN assessments a ON a.id = ( \
                     SELECT id FROM assessments WHERE employee_id = e.id \
                     ORDER BY created_at DESC, id DESC LIMIT 1) \
                 ORDER BY e.id ASC",
                (),
            )
            .await?;

        let mut overviews = Vec::new();
        while let Some(row) = rows.next().await? {
            let employee = Self::parse_employee(&row)?;
            let risk: Option<i64> = row.get(4)?;
            let label: Option<String> = row.get(5)?;

            overviews.push(EmployeeOverview {
                employee,
                latest_risk: risk.map(parse_risk).transpose()?,
                latest_label: label.as_deref().map(parse_label).transpose()?,
            });
        }
        Ok(overviews)
    }
}

fn is_remote_url(url: &str) -> bool {
    ["libsql://", "http://", "https://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

fn parse_risk(value: i64) -> Result<RiskScore> {
    RiskScore::new(value).ok_or_else(|| Error::InvalidData(format!("invalid risk score: {}", value)))
}

fn parse_label(s: &str) -> Result<RiskLabel> {
    RiskLabel::parse(s).ok_or_else(|| Error::InvalidData(format!("invalid label: {}", s)))
}

/// Parse a datetime from storage.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidData(format!("invalid datetime: {}", s)))
}
