//! REST API handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use wellmind_core::{
    AnalyzeRequest, AssessmentId, AssessmentSnapshot, CallbackOutcome, DashboardSummary,
    EmployeeId, EmployeeOverview, NewEmployee, PipelineError, RiskLabel, RiskScore,
    SurveyResponses, WorkflowStatus,
};

use crate::AppState;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "WellMind Backend";

/// Label reported for employees without any assessment
const NO_LABEL: &str = "N/A";

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

/// Failure of an API call, rendered as [`ErrorResponse`]
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    Validation(String),
    /// Referenced record does not exist (404)
    NotFound(String),
    /// The scoring service failed (502)
    Scoring(String),
    /// The record store failed (500)
    Store(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Scoring(_) => (StatusCode::BAD_GATEWAY, "SCORING_FAILED"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_FAILED"),
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::Scoring(m)
            | ApiError::Store(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(%status, code, error = self.message(), "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.message().to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::EmployeeNotFound(_) | PipelineError::AssessmentNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            PipelineError::Validation(_) => ApiError::Validation(err.to_string()),
            PipelineError::Scoring(_) => ApiError::Scoring(err.to_string()),
            PipelineError::Store(_) => ApiError::Store(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Service name
    pub service: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ============================================================================
// Survey
// ============================================================================

/// Survey submission body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SurveyBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Survey submission response
#[derive(Debug, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub employee_id: EmployeeId,
    pub message: String,
}

/// POST /api/survey
pub async fn submit_survey(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SurveyBody>, JsonRejection>,
) -> Result<Json<SurveyResponse>, ApiError> {
    let Json(body) = body?;
    let employee = NewEmployee::new(
        body.name.unwrap_or_default(),
        body.department.as_deref(),
        body.email.unwrap_or_default(),
    )
    .map_err(PipelineError::from)?;

    let employee = state.pipeline.submit_survey(employee).await?;

    Ok(Json(SurveyResponse {
        employee_id: employee.id,
        message: "Survey received, processing...".to_string(),
    }))
}

// ============================================================================
// Analysis
// ============================================================================

/// Analysis request body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub responses: SurveyResponses,
}

/// Analysis response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub assessment_id: AssessmentId,
    pub risk: RiskScore,
    pub label: RiskLabel,
    pub ledger_tx: String,
    pub ledger_simulated: bool,
    pub workflow_status: WorkflowStatus,
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(body) = body?;
    let employee_id = body
        .employee_id
        .ok_or_else(|| ApiError::Validation("employee_id is required".to_string()))?;

    let outcome = state
        .pipeline
        .analyze(AnalyzeRequest {
            employee_id,
            responses: body.responses,
        })
        .await?;

    Ok(Json(AnalyzeResponse {
        assessment_id: outcome.assessment_id,
        risk: outcome.risk,
        label: outcome.label,
        ledger_tx: outcome.ledger_txid,
        ledger_simulated: outcome.ledger_simulated,
        workflow_status: outcome.workflow_status,
    }))
}

// ============================================================================
// Workflow callback
// ============================================================================

/// Status update pushed by the workflow engine
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CallbackBody {
    #[serde(default)]
    pub result_id: Option<AssessmentId>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Callback acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub status: String,
}

/// POST /api/orchestrate/callback
pub async fn workflow_callback(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CallbackBody>, JsonRejection>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let Json(body) = body?;
    let id = body
        .result_id
        .ok_or_else(|| ApiError::Validation("result_id is required".to_string()))?;
    let status = body.status.unwrap_or_default();

    match state.pipeline.apply_workflow_callback(id, &status).await? {
        CallbackOutcome::Applied => info!(%id, "workflow callback applied"),
        CallbackOutcome::UnknownAssessment => warn!(%id, "workflow callback had no target"),
    }

    Ok(Json(CallbackResponse {
        status: "callback received".to_string(),
    }))
}

// ============================================================================
// Queries
// ============================================================================

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.pipeline.dashboard().await?))
}

/// Employee with their latest assessment, as listed by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub email: String,
    pub latest_risk: Option<RiskScore>,
    pub latest_label: String,
}

impl From<EmployeeOverview> for EmployeeRow {
    fn from(overview: EmployeeOverview) -> Self {
        Self {
            id: overview.employee.id,
            name: overview.employee.name,
            department: overview.employee.department,
            email: overview.employee.email,
            latest_risk: overview.latest_risk,
            latest_label: overview
                .latest_label
                .map_or_else(|| NO_LABEL.to_string(), |label| label.to_string()),
        }
    }
}

/// GET /api/employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EmployeeRow>>, ApiError> {
    let employees = state.pipeline.employees().await?;
    Ok(Json(employees.into_iter().map(EmployeeRow::from).collect()))
}

/// GET /api/results/:id
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AssessmentSnapshot>, ApiError> {
    let Path(id) = id?;
    let assessment = state.pipeline.get_assessment(AssessmentId(id)).await?;
    Ok(Json(assessment.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    async fn create_test_app() -> TestServer {
        let state = Arc::new(AppState::new_for_testing().await.unwrap());
        let router = Router::new()
            .route("/api/health", get(health))
            .route("/api/survey", post(submit_survey))
            .route("/api/analyze", post(analyze))
            .route("/api/orchestrate/callback", post(workflow_callback))
            .route("/api/dashboard", get(dashboard))
            .route("/api/employees", get(list_employees))
            .route("/api/results/:id", get(get_result))
            .with_state(state);
        TestServer::new(router).unwrap()
    }

    async fn submit(server: &TestServer, name: &str, email: &str) -> i64 {
        let response = server
            .post("/api/survey")
            .json(&json!({"name": name, "email": email}))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["employee_id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = create_test_app().await;

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, SERVICE_NAME);
        assert!(!body.version.is_empty());
    }

    #[tokio::test]
    async fn test_survey_creates_employee_once_per_email() {
        let server = create_test_app().await;

        let first = submit(&server, "A", "a@x.com").await;
        let again = submit(&server, "A. Renamed", "a@x.com").await;
        let other = submit(&server, "B", "b@x.com").await;

        assert_eq!(first, 1);
        assert_eq!(again, 1);
        assert_eq!(other, 2);
    }

    #[tokio::test]
    async fn test_survey_reports_message() {
        let server = create_test_app().await;

        let response = server
            .post("/api/survey")
            .json(&json!({"name": "A", "department": "Ops", "email": "a@x.com"}))
            .await;

        let body: SurveyResponse = response.json();
        assert_eq!(body.employee_id, EmployeeId(1));
        assert_eq!(body.message, "Survey received, processing...");
    }

    #[tokio::test]
    async fn test_survey_without_email_is_rejected() {
        let server = create_test_app().await;

        let response = server.post("/api/survey").json(&json!({"name": "A"})).await;

        response.assert_status_bad_request();
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_FAILED");

        let employees: Vec<Value> = server.get("/api/employees").await.json();
        assert!(employees.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_validation_failure() {
        let server = create_test_app().await;

        let response = server
            .post("/api/survey")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;

        response.assert_status_bad_request();
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_analyze_returns_scored_and_anchored_result() {
        let server = create_test_app().await;
        let employee_id = submit(&server, "A", "a@x.com").await;

        let response = server
            .post("/api/analyze")
            .json(&json!({"employee_id": employee_id, "responses": {"q1": "tired"}}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["risk"], 32);
        assert_eq!(body["label"], "Low");
        let ledger_tx = body["ledger_tx"].as_str().unwrap();
        assert!(ledger_tx.starts_with("0.0.1-"));
        assert_eq!(ledger_tx.len(), 14);
        assert_eq!(body["ledger_simulated"], true);
        // No workflow engine is configured in the test state.
        assert_eq!(body["workflow_status"], "failed");
    }

    #[tokio::test]
    async fn test_analyze_unknown_employee_is_not_found() {
        let server = create_test_app().await;

        let response = server
            .post("/api/analyze")
            .json(&json!({"employee_id": 99, "responses": {"q1": "tired"}}))
            .await;

        response.assert_status_not_found();
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "NOT_FOUND");

        let dashboard: Value = server.get("/api/dashboard").await.json();
        assert_eq!(dashboard["recent_results"], json!([]));
    }

    #[tokio::test]
    async fn test_analyze_requires_employee_id() {
        let server = create_test_app().await;

        let response = server
            .post("/api/analyze")
            .json(&json!({"responses": {"q1": "tired"}}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_callback_overwrites_status() {
        let server = create_test_app().await;
        let employee_id = submit(&server, "A", "a@x.com").await;
        let analyzed: Value = server
            .post("/api/analyze")
            .json(&json!({"employee_id": employee_id, "responses": {}}))
            .await
            .json();
        let result_id = analyzed["assessment_id"].as_i64().unwrap();

        let response = server
            .post("/api/orchestrate/callback")
            .json(&json!({"result_id": result_id, "status": "hr_contacted"}))
            .await;

        response.assert_status_ok();
        let body: CallbackResponse = response.json();
        assert_eq!(body.status, "callback received");

        let result: Value = server.get(&format!("/api/results/{}", result_id)).await.json();
        assert_eq!(result["workflow_status"], "hr_contacted");
    }

    #[tokio::test]
    async fn test_callback_for_unknown_result_still_succeeds() {
        let server = create_test_app().await;

        let response = server
            .post("/api/orchestrate/callback")
            .json(&json!({"result_id": 404, "status": "completed"}))
            .await;

        response.assert_status_ok();
        let body: CallbackResponse = response.json();
        assert_eq!(body.status, "callback received");
        server.get("/api/results/404").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_callback_with_empty_status_is_rejected() {
        let server = create_test_app().await;

        let response = server
            .post("/api/orchestrate/callback")
            .json(&json!({"result_id": 1, "status": ""}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_dashboard_when_empty() {
        let server = create_test_app().await;

        let response = server.get("/api/dashboard").await;

        response.assert_status_ok();
        let body: DashboardSummary = response.json();
        assert_eq!(body.flagged_employees, 0);
        assert_eq!(body.average_risk, 0.0);
        assert_eq!(body.ledger_verified, 0);
        assert!(body.recent_results.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_after_analysis() {
        let server = create_test_app().await;
        let employee_id = submit(&server, "A", "a@x.com").await;
        for answers in [json!({"q1": "tired"}), json!({"work_hours": "60", "stress": "9"})] {
            server
                .post("/api/analyze")
                .json(&json!({"employee_id": employee_id, "responses": answers}))
                .await
                .assert_status_ok();
        }

        let body: Value = server.get("/api/dashboard").await.json();

        // Scores are 32 and 100.
        assert_eq!(body["average_risk"], 66.0);
        assert_eq!(body["flagged_employees"], 1);
        assert_eq!(body["ledger_verified"], 2);
        let recent = body["recent_results"].as_array().unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0]["risk_score"], 100);
        assert_eq!(recent[0]["employee_name"], "A");
    }

    #[tokio::test]
    async fn test_employees_list_latest_label_or_placeholder() {
        let server = create_test_app().await;
        let analyzed = submit(&server, "A", "a@x.com").await;
        submit(&server, "B", "b@x.com").await;
        server
            .post("/api/analyze")
            .json(&json!({"employee_id": analyzed, "responses": {"q1": "tired"}}))
            .await
            .assert_status_ok();

        let response = server.get("/api/employees").await;

        response.assert_status_ok();
        let rows: Vec<EmployeeRow> = response.json();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].latest_risk.map(RiskScore::value), Some(32));
        assert_eq!(rows[0].latest_label, "Low");
        assert_eq!(rows[0].department, "General");
        assert_eq!(rows[1].latest_risk, None);
        assert_eq!(rows[1].latest_label, "N/A");
    }

    #[tokio::test]
    async fn test_result_with_bad_id_is_rejected() {
        let server = create_test_app().await;

        let response = server.get("/api/results/abc").await;

        response.assert_status_bad_request();
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_FAILED");
    }

    #[test]
    fn test_pipeline_errors_map_to_codes() {
        let cases = [
            (
                ApiError::from(PipelineError::EmployeeNotFound(EmployeeId(1))),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(PipelineError::Scoring(
                    wellmind_core::scoring::ScoringError::Status(500),
                )),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(PipelineError::Validation(
                    wellmind_core::ValidationError::new("bad"),
                )),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_and_code().0, status);
        }
    }
}
