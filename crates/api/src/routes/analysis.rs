//! Image analysis routes

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use storage::{AnalysisRecord, DEFAULT_ANALYSIS_LIMIT};

use crate::upload::analyze_and_save;
use crate::{ApiError, AppState};

/// Upper bound on `limit`
pub const MAX_ANALYSIS_LIMIT: usize = 500;

/// Query parameters for the analysis history endpoint
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_ANALYSIS_LIMIT
}

/// Response for the analysis history endpoint
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub data: Vec<AnalysisRecord>,
    pub count: usize,
}

/// Joined capture/result history, newest first
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let limit = params.limit.min(MAX_ANALYSIS_LIMIT);
    let data = state.analyses.get_all_analysis(limit).await?;

    Ok(Json(AnalysisResponse {
        count: data.len(),
        data,
    }))
}

/// Camera push: raw image body is analyzed and recorded
pub async fn camera_callback(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No image data received".to_string()));
    }

    let outcome = analyze_and_save(&state, "temp", &body).await?;

    Ok(Json(json!({
        "status": "Image analyzed and result saved",
        "image_id": outcome.saved.image_id,
    })))
}
