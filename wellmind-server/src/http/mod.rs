//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub use api::{
    AnalyzeBody, AnalyzeResponse, ApiError, CallbackBody, CallbackResponse, EmployeeRow,
    ErrorResponse, HealthResponse, SurveyBody, SurveyResponse,
};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/survey", post(api::submit_survey))
        .route("/api/analyze", post(api::analyze))
        .route("/api/orchestrate/callback", post(api::workflow_callback))
        .route("/api/dashboard", get(api::dashboard))
        .route("/api/employees", get(api::list_employees))
        .route("/api/results/:id", get(api::get_result))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
