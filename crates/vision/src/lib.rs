//! Crop Image Analysis
//!
//! Estimates strawberry ripeness and open flower count from a captured image.
//! Callers depend on the [`ImageAnalyzer`] trait; [`HeuristicAnalyzer`] is a
//! color-rule implementation that needs no model files.

mod heuristic;
mod pixels;

pub use heuristic::{AnalyzerConfig, HeuristicAnalyzer};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Analysis error types
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Failed to open image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,
}

/// Ripeness estimate: score in `[0, 100]` (absent when no fruit is visible)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RipenessEstimate {
    pub score: Option<f64>,
    pub label: String,
}

/// Flower estimate: count of open flowers (absent when not determinable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerEstimate {
    pub count: Option<i64>,
    pub label: String,
}

/// Image analysis seam used by the ingestion boundary
pub trait ImageAnalyzer: Send + Sync {
    /// Estimate fruit ripeness
    fn analyze_ripeness(&self, path: &Path) -> Result<RipenessEstimate, AnalyzerError>;

    /// Count open flowers
    fn analyze_flowers(&self, path: &Path) -> Result<FlowerEstimate, AnalyzerError>;
}

/// Analyzer returning fixed estimates regardless of input
#[derive(Debug, Clone)]
pub struct StaticAnalyzer {
    pub ripeness: RipenessEstimate,
    pub flowers: FlowerEstimate,
}

impl StaticAnalyzer {
    /// Create a static analyzer
    pub fn new(ripeness: RipenessEstimate, flowers: FlowerEstimate) -> Self {
        Self { ripeness, flowers }
    }
}

impl ImageAnalyzer for StaticAnalyzer {
    fn analyze_ripeness(&self, _path: &Path) -> Result<RipenessEstimate, AnalyzerError> {
        Ok(self.ripeness.clone())
    }

    fn analyze_flowers(&self, _path: &Path) -> Result<FlowerEstimate, AnalyzerError> {
        Ok(self.flowers.clone())
    }
}
