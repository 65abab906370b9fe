//! Health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
}

fn health(state: &AppState, module: &str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: module.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
    })
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    health(&state, "newsroom-server")
}

/// GET /admin/health
pub async fn admin_health(State(state): State<AppState>) -> Json<HealthResponse> {
    health(&state, "admin")
}

/// GET /reporter/health
pub async fn reporter_health(State(state): State<AppState>) -> Json<HealthResponse> {
    health(&state, "reporter")
}

/// Health routes; none of them require a session
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/admin/health", get(admin_health))
        .route("/reporter/health", get(reporter_health))
}
