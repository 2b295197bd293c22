//! Service info and health check.

use axum::Json;

use crate::models::{HealthResponse, RootResponse};

/// `GET /`: service name and version.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Tasktrack API".to_string(),
        version: tasktrack_core::version().to_string(),
    })
}

/// `GET /health`: liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
