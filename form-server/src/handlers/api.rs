//! JSON API handlers

use axum::{extract::State, Json};
use serde::Serialize;

use predictor_core::model::EngineStatus;
use predictor_core::{LayoutInfo, ModelMetadata};

use crate::models::{PredictionForm, PredictionResponse};
use crate::{AppError, AppResult, AppState};

/// Predict from a JSON body with the 11 named fields
pub async fn predict(
    State(state): State<AppState>,
    Json(form): Json<PredictionForm>,
) -> AppResult<Json<PredictionResponse>> {
    let features = form.into_features().map_err(|errors| {
        let message = errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        AppError::ValidationError(message)
    })?;

    let prediction = state.predictor.predict(&features)?;
    tracing::debug!(features = %features.to_log_entry(), "API prediction");

    Ok(Json(PredictionResponse::new(features, prediction)))
}

/// Feature layout + input bounds
pub async fn schema() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub metadata: ModelMetadata,
    pub engine: EngineStatus,
}

/// Loaded model metadata and inference statistics
pub async fn model(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(ModelInfo {
        metadata: state.metadata.as_ref().clone(),
        engine: state.predictor.status(),
    })
}
