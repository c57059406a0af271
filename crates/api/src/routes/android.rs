//! Mobile app routes under `/android`

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use data_validator::{SensorInput, SENSOR_FIELDS};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::routes::sensors::{latest_graded, LatestReading};
use crate::upload::analyze_and_save;
use crate::{ApiError, AppState};

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// Echo of an analysis run
#[derive(Debug, Serialize)]
pub struct AiResponse {
    pub status: &'static str,
    pub ripeness_text: String,
    pub ripeness_score: Option<f64>,
    pub flower_count: Option<i64>,
    pub flower_status: String,
}

/// Liveness probe
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Most recent reading
pub async fn sensor_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestReading>, ApiError> {
    latest_graded(&state, "No data").await
}

/// Ingest a reading; every field key must be present (values may be null)
///
/// A body that is not a JSON object is treated as an empty object.
pub async fn sensor_post(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let mut fields: Map<String, Value> = serde_json::from_slice(&body).unwrap_or_default();

    let missing: Vec<&'static str> = SENSOR_FIELDS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields {
            required: SENSOR_FIELDS.to_vec(),
            missing,
        });
    }

    let mut take = |key: &str| fields.remove(key).unwrap_or(Value::Null);
    let input = SensorInput {
        soil_moisture: take("soil_moisture"),
        air_temperature: take("air_temperature"),
        air_humidity: take("air_humidity"),
        light_intensity: take("light_intensity"),
        water_level: take("water_level"),
    };

    let id = state.sensors.save(&input).await?;
    metrics::counter!("sensor_readings_saved_total").increment(1);
    info!("Android sensor reading {} saved", id);

    Ok(Json(json!({ "status": "ok" })))
}

/// Multipart image upload: analyze, record, and echo the result
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AiResponse>, ApiError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            image = Some(bytes);
            break;
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("file '{IMAGE_FIELD}' required")))?;

    let outcome = analyze_and_save(&state, "android", &image).await?;

    Ok(Json(AiResponse {
        status: "analyzed",
        ripeness_text: outcome.ripeness.label,
        ripeness_score: outcome.ripeness.score,
        flower_count: outcome.flowers.count,
        flower_status: outcome.flowers.label,
    }))
}
