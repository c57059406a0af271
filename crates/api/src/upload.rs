//! Temporary image files and the analyze-then-save flow

use crate::{ApiError, AppState};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use storage::{NewAnalysis, SavedAnalysis};
use tracing::{info, warn};
use vision::{FlowerEstimate, RipenessEstimate};

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Uploaded image on disk, removed when dropped
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write `bytes` to a fresh file under `dir`
    pub async fn write(dir: &Path, prefix: &str, bytes: &[u8]) -> Result<Self, ApiError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("{prefix}_{secs}_{seq}.jpg"));

        // Guard exists before the write so a partial file is still removed
        let upload = Self { path };
        tokio::fs::write(&upload.path, bytes).await?;
        info!("Image saved: {} ({} bytes)", upload.path.display(), bytes.len());
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Temp image removed: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Temp image remove failed for {}: {}", self.path.display(), e),
        }
    }
}

/// Outcome of analyzing and recording one image
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub saved: SavedAnalysis,
    pub ripeness: RipenessEstimate,
    pub flowers: FlowerEstimate,
}

/// Store the image, run both analyses off the async runtime and persist
/// the results atomically. The temporary file is gone when this returns.
pub async fn analyze_and_save(
    state: &AppState,
    prefix: &str,
    bytes: &[u8],
) -> Result<AnalysisOutcome, ApiError> {
    let upload = TempUpload::write(&state.upload_dir, prefix, bytes).await?;

    let analyzer = state.analyzer.clone();
    let path = upload.path().to_path_buf();
    let (ripeness, flowers) = tokio::task::spawn_blocking(move || {
        let ripeness = analyzer.analyze_ripeness(&path)?;
        let flowers = analyzer.analyze_flowers(&path)?;
        Ok::<_, vision::AnalyzerError>((ripeness, flowers))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    info!(
        "Analysis result: ripeness '{}' ({:?}), flowers {:?}",
        ripeness.label, ripeness.score, flowers.count
    );

    let saved = state
        .analyses
        .save_analysis(&NewAnalysis {
            file_path: upload.path().to_string_lossy().into_owned(),
            ripeness_score: ripeness.score,
            ripeness_text: Some(ripeness.label.clone()),
            flower_count: flowers.count,
            flower_text: Some(flowers.label.clone()),
        })
        .await?;
    metrics::counter!("analysis_results_saved_total").increment(1);

    Ok(AnalysisOutcome {
        saved,
        ripeness,
        flowers,
    })
}
