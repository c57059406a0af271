//! Storage Layer
//!
//! SQLite persistence for sensor readings and image analysis results.
//! Every repository call acquires its own pooled connection and releases it
//! when the call returns, on success or failure.

mod analysis;
mod database;
mod models;
mod schema;
mod sensor;

pub use analysis::{AnalysisRepository, DEFAULT_ANALYSIS_LIMIT};
pub use database::{Database, StorageConfig};
pub use models::{AnalysisRecord, NewAnalysis, NewSensorReading, SavedAnalysis, SensorReading};
pub use sensor::SensorRepository;

use data_validator::ValidationError;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Caller input rejected before any store access
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store rejected or failed an operation
    #[error("Database error during {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Filesystem error while preparing the store location
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Build a mapper that wraps an sqlx error for the named operation
    pub(crate) fn persistence(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StorageError::Persistence { operation, source }
    }

    /// Whether the error was caused by caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, StorageError::Validation(_))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{Database, StorageConfig};
    use tempfile::TempDir;

    /// Open a fresh database inside a temporary directory
    pub async fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            db_path: dir.path().join("farm.db"),
            ..Default::default()
        };
        let db = Database::connect(&config).await.unwrap();
        (dir, db)
    }
}
