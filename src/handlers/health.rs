use std::sync::Arc;
use axum::{extract::State, Json};
use crate::app::AppState;
use crate::models::HealthResponse;
use tracing::debug;

/// Health check endpoint
pub async fn health_check(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        service: app_state.service_name.clone(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint
pub async fn ready_check(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Readiness check requested");
    // Rooms live in memory only, so there is nothing external to wait for.
    Json(HealthResponse {
        status: "ok".to_string(),
        service: app_state.service_name.clone(),
        message: "Service is ready".to_string(),
    })
}
