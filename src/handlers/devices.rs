//! Device record handlers

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, State, Path},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{AppState, AppResult, AppError};
use crate::models::{parse_features, Device};

/// List every stored device
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Device>>> {
    let devices = Device::list_all(&state.pool).await?;
    Ok(Json(devices))
}

/// Get single device
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Device>> {
    let Path(id) = path?;

    let device = Device::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))?;

    Ok(Json(device))
}

/// Store a new device.
///
/// Responds with the submitted values and the assigned id.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let Json(body) = payload?;

    let object = body
        .as_object()
        .ok_or_else(|| AppError::ValidationError("Request body must be a JSON object".to_string()))?;

    let features = parse_features(object).map_err(AppError::InvalidFields)?;
    let id = Device::create(&state.pool, &features).await?;

    tracing::info!(device_id = id, "Device stored");

    Ok((StatusCode::CREATED, Json(Device { id, features })))
}
