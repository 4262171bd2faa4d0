//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelHealth,
}

#[derive(Serialize)]
pub struct ModelHealth {
    format: &'static str,
    /// First 12 hex chars of the artifact digest
    sha256: String,
    loaded_at: DateTime<Utc>,
    inference_count: u64,
}

/// The model is loaded before the listener binds, so reaching this means ready
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let metadata = &state.metadata;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
        model: ModelHealth {
            format: metadata.format.as_str(),
            sha256: metadata.sha256.chars().take(12).collect(),
            loaded_at: metadata.loaded_at,
            inference_count: state.predictor.status().inference_count,
        },
    })
}
