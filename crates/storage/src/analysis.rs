//! Image capture and analysis repository

use crate::models::{AnalysisRecord, NewAnalysis, SavedAnalysis};
use crate::{Database, StorageError};
use data_validator::{require_non_empty, ValidationError};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info, warn};

/// Default row cap for [`AnalysisRepository::get_all_analysis`]
pub const DEFAULT_ANALYSIS_LIMIT: usize = 30;

/// Repository for `image_capture` and `ai_result`
#[derive(Debug, Clone)]
pub struct AnalysisRepository {
    db: Database,
}

impl AnalysisRepository {
    /// Create a new repository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Store an image capture and its analysis atomically
    ///
    /// Both rows are committed together. On any failure the transaction is
    /// rolled back before the error is returned, so neither row remains.
    pub async fn save_analysis(&self, analysis: &NewAnalysis) -> Result<SavedAnalysis, StorageError> {
        let file_path = require_non_empty("file_path", &analysis.file_path)?;
        if analysis.ripeness_score.is_some_and(|s| !s.is_finite()) {
            return Err(ValidationError::NonFinite {
                field: "ripeness_score",
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        match insert_pair(&mut tx, file_path, analysis).await {
            Ok(saved) => {
                tx.commit()
                    .await
                    .map_err(StorageError::persistence("commit image analysis"))?;
                info!(
                    "Saved image analysis: image {} result {} ({})",
                    saved.image_id, saved.ai_result_id, file_path
                );
                Ok(saved)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback of image analysis failed: {}", rollback_err);
                }
                warn!("Image analysis for {} rolled back: {}", file_path, err);
                Err(err)
            }
        }
    }

    /// Image id stored under exactly this path
    ///
    /// Paths are compared as stored; callers normalize before lookup. When
    /// the same path was captured more than once the newest id wins.
    pub async fn find_image_id_by_path(&self, file_path: &str) -> Result<Option<i64>, StorageError> {
        let mut conn = self.db.acquire().await?;
        sqlx::query_scalar("SELECT id FROM image_capture WHERE file_path = ? ORDER BY id DESC LIMIT 1")
            .bind(file_path)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StorageError::persistence("select image capture by path"))
    }

    /// Joined capture and analysis history, newest first, capped to `limit`
    pub async fn get_all_analysis(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.db.acquire().await?;
        let records = sqlx::query_as::<_, AnalysisRecord>(
            r#"
            SELECT
                ic.id,
                ic.timestamp,
                ic.file_path,
                ar.ripeness_text,
                ar.ripeness_score,
                ar.flower_count,
                ar.flower_text
            FROM image_capture ic
            JOIN ai_result ar ON ic.id = ar.image_id
            ORDER BY ic.timestamp DESC, ic.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(StorageError::persistence("select analysis history"))?;

        debug!("Loaded {} analysis records", records.len());
        Ok(records)
    }

    /// Number of committed capture/result pairs
    pub async fn count(&self) -> Result<i64, StorageError> {
        let mut conn = self.db.acquire().await?;
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM image_capture ic JOIN ai_result ar ON ic.id = ar.image_id",
        )
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::persistence("count analysis records"))
    }
}

/// Insert the capture, then the result referencing its generated id
async fn insert_pair(
    tx: &mut Transaction<'static, Sqlite>,
    file_path: &str,
    analysis: &NewAnalysis,
) -> Result<SavedAnalysis, StorageError> {
    let image_id = sqlx::query("INSERT INTO image_capture (file_path) VALUES (?)")
        .bind(file_path)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::persistence("insert image capture"))?
        .last_insert_rowid();

    let ai_result_id = sqlx::query(
        r#"
        INSERT INTO ai_result (image_id, ripeness_score, ripeness_text, flower_count, flower_text)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(image_id)
    .bind(analysis.ripeness_score)
    .bind(analysis.ripeness_text.as_deref())
    .bind(analysis.flower_count)
    .bind(analysis.flower_text.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(StorageError::persistence("insert ai result"))?
    .last_insert_rowid();

    Ok(SavedAnalysis {
        image_id,
        ai_result_id,
    })
}
