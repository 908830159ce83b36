use axum::{extract::Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    /// Seconds since the server started
    uptime: f64,
    timestamp: String,
}

/// Health check endpoint
///
/// Liveness only: answers as long as the process can serve requests.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
