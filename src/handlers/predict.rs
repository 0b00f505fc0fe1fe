//! Prediction handlers

use axum::{extract::{rejection::PathRejection, State, Path}, Json};
use serde::Serialize;

use crate::{AppState, AppResult, AppError};
use crate::inference::ModelInfo;
use crate::models::Device;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub price_range: i64,
}

/// Predict the price range of a stored device
pub async fn predict(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Path(id) = path?;

    let device = Device::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))?;

    let price_range = state.predictor.predict(&device.features);
    tracing::debug!(device_id = id, price_range, "Prediction made");

    Ok(Json(PredictionResponse { price_range }))
}

/// Describe the loaded model artifacts
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.predictor.info().clone())
}
