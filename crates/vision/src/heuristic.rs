//! Color-rule analyzer

use crate::pixels::{count_petal_blobs, ClassHistogram};
use crate::{AnalyzerError, FlowerEstimate, ImageAnalyzer, RipenessEstimate};
use image::{ImageReader, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Heuristic analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Images larger than this on either side are downscaled first
    pub max_dimension: u32,
    /// Minimum share of fruit-colored pixels before a ripeness is reported
    pub min_fruit_fraction: f64,
    /// Ripeness score at or above which fruit is "ripe"
    pub ripe_threshold: f64,
    /// Ripeness score at or above which fruit is "turning"
    pub turning_threshold: f64,
    /// Smallest petal blob counted as a flower (pixels, after downscaling)
    pub min_flower_pixels: usize,
    /// Flower count at or above which the plant is in full bloom
    pub full_bloom_count: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_dimension: 256,
            min_fruit_fraction: 0.01,
            ripe_threshold: 80.0,
            turning_threshold: 40.0,
            min_flower_pixels: 4,
            full_bloom_count: 5,
        }
    }
}

/// Rule-based analyzer working on pixel colors
#[derive(Debug, Clone, Default)]
pub struct HeuristicAnalyzer {
    config: AnalyzerConfig,
}

impl HeuristicAnalyzer {
    /// Create a new analyzer
    pub fn new(config: AnalyzerConfig) -> Self {
        info!("Creating heuristic image analyzer with config: {:?}", config);
        Self { config }
    }

    fn load(&self, path: &Path) -> Result<RgbImage, AnalyzerError> {
        // Content decides the format; upload names always end in .jpg
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        if img.width() == 0 || img.height() == 0 {
            return Err(AnalyzerError::EmptyImage);
        }

        let max = self.config.max_dimension.max(1);
        let img = if img.width() > max || img.height() > max {
            debug!(
                "Downscaling {}x{} image to fit {}",
                img.width(),
                img.height(),
                max
            );
            img.thumbnail(max, max)
        } else {
            img
        };

        Ok(img.to_rgb8())
    }

    /// Ripeness of a decoded image
    pub fn ripeness_of(&self, img: &RgbImage) -> RipenessEstimate {
        let hist = ClassHistogram::compute(img);
        let fruit = hist.ripe + hist.unripe;
        if fruit == 0 || hist.fruit_fraction() < self.config.min_fruit_fraction {
            return RipenessEstimate {
                score: None,
                label: "no fruit detected".to_string(),
            };
        }

        let ratio = hist.ripe as f64 / fruit as f64;
        let score = (ratio * 10_000.0).round() / 100.0;

        let label = if score >= self.config.ripe_threshold {
            "ripe"
        } else if score >= self.config.turning_threshold {
            "turning"
        } else {
            "unripe"
        };

        RipenessEstimate {
            score: Some(score),
            label: label.to_string(),
        }
    }

    /// Flower count of a decoded image
    pub fn flowers_of(&self, img: &RgbImage) -> FlowerEstimate {
        let count = count_petal_blobs(img, self.config.min_flower_pixels) as i64;

        let label = if count == 0 {
            "no flowers"
        } else if count >= self.config.full_bloom_count {
            "full bloom"
        } else {
            "flowering"
        };

        FlowerEstimate {
            count: Some(count),
            label: label.to_string(),
        }
    }
}

impl ImageAnalyzer for HeuristicAnalyzer {
    fn analyze_ripeness(&self, path: &Path) -> Result<RipenessEstimate, AnalyzerError> {
        let img = self.load(path)?;
        let estimate = self.ripeness_of(&img);
        debug!("Ripeness for {}: {:?}", path.display(), estimate);
        Ok(estimate)
    }

    fn analyze_flowers(&self, path: &Path) -> Result<FlowerEstimate, AnalyzerError> {
        let img = self.load(path)?;
        let estimate = self.flowers_of(&img);
        debug!("Flowers for {}: {:?}", path.display(), estimate);
        Ok(estimate)
    }
}
