//! Sensor Routes

use axum::{body::Bytes, extract::State, Json};
use data_validator::SensorInput;
use scoring::Grade;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use storage::SensorReading;
use tracing::info;

use crate::{ApiError, AppState};

/// Latest reading with the grade of its composite score
#[derive(Debug, Serialize)]
pub struct LatestReading {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub grade: Grade,
}

/// Look up the newest reading and grade it
pub(crate) async fn latest_graded(
    state: &AppState,
    not_found: &'static str,
) -> Result<Json<LatestReading>, ApiError> {
    let reading = state
        .sensors
        .get_latest()
        .await?
        .ok_or(ApiError::NotFound(not_found))?;
    let grade = state.sensors.scoring().grade(reading.composite_score);

    Ok(Json(LatestReading { reading, grade }))
}

/// Response for the history endpoint
#[derive(Debug, Serialize)]
pub struct SensorHistoryResponse {
    pub data: Vec<SensorReading>,
    pub count: usize,
}

/// Ingest a reading from a field device; any subset of fields may be sent
pub async fn receive(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let input: SensorInput = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
    info!("Sensor data received: {:?}", input);
    let id = state.sensors.save(&input).await?;
    metrics::counter!("sensor_readings_saved_total").increment(1);

    Ok(Json(json!({ "status": "Sensor data saved", "id": id })))
}

/// Most recent reading
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestReading>, ApiError> {
    latest_graded(&state, "No data available").await
}

/// Full reading history, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SensorHistoryResponse>, ApiError> {
    let data = state.sensors.get_all().await?;

    Ok(Json(SensorHistoryResponse {
        count: data.len(),
        data,
    }))
}
