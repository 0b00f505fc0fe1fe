//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppResult};
use crate::models::Device;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    devices: i64,
}

pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let devices = Device::count(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        devices,
    }))
}
