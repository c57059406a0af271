//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};
use vision::AnalyzerError;

/// Errors surfaced by handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("missing fields: {}", missing.join(", "))]
    MissingFields {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
    },

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("Upload I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Validation(inner) => ApiError::Validation(inner),
            other => ApiError::Storage(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                metrics::counter!("ingest_rejected_total").increment(1);
                warn!("Rejected request: {}", self);
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::MissingFields { required, missing } => {
                metrics::counter!("ingest_rejected_total").increment(1);
                warn!("Rejected request: {}", self);
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "missing fields",
                        "required": required,
                        "missing": missing,
                    }),
                )
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            ApiError::Analyzer(err) => {
                error!("Image analysis failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Image processing failed", "detail": err.to_string() }),
                )
            }
            ApiError::Storage(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
