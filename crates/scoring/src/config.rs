//! Optimal band configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Triangular response band for one metric
///
/// Scores peak at `center`, fall linearly to zero at `half_width` distance,
/// and are forced to zero at or outside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalBand {
    /// Ideal value
    pub center: f64,
    /// Distance from center at which the score reaches zero
    pub half_width: f64,
    /// Lower admissible bound (exclusive)
    pub min: f64,
    /// Upper admissible bound (exclusive)
    pub max: f64,
}

impl OptimalBand {
    /// Create a new band
    pub const fn new(center: f64, half_width: f64, min: f64, max: f64) -> Self {
        Self {
            center,
            half_width,
            min,
            max,
        }
    }

    /// Soil moisture band (%)
    pub const fn soil() -> Self {
        Self::new(45.0, 10.0, 0.0, 100.0)
    }

    /// Air humidity band (%)
    pub const fn air_humidity() -> Self {
        Self::new(60.0, 10.0, 0.0, 100.0)
    }

    /// Air temperature band (°C)
    pub const fn temperature() -> Self {
        Self::new(24.0, 6.0, 5.0, 40.0)
    }

    /// Check that the band can produce meaningful scores
    pub fn validate(&self, band: &'static str) -> Result<(), ConfigError> {
        for (param, value) in [
            ("center", self.center),
            ("half_width", self.half_width),
            ("min", self.min),
            ("max", self.max),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { band, param });
            }
        }

        if self.half_width <= 0.0 {
            return Err(ConfigError::InvalidHalfWidth {
                band,
                half_width: self.half_width,
            });
        }

        if self.min >= self.max {
            return Err(ConfigError::EmptyDomain {
                band,
                min: self.min,
                max: self.max,
            });
        }

        if self.center <= self.min || self.center >= self.max {
            return Err(ConfigError::CenterOutOfDomain {
                band,
                center: self.center,
                min: self.min,
                max: self.max,
            });
        }

        Ok(())
    }
}

/// Composite score thresholds used for grading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeThresholds {
    /// Composite at or above this is good
    pub good: f64,
    /// Composite at or above this (but below `good`) is a warning
    pub warn: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            good: 80.0,
            warn: 50.0,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Soil moisture band
    pub soil: OptimalBand,
    /// Air humidity band
    pub air_humidity: OptimalBand,
    /// Air temperature band
    pub temperature: OptimalBand,
    /// Grading thresholds for the composite
    pub thresholds: GradeThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            soil: OptimalBand::soil(),
            air_humidity: OptimalBand::air_humidity(),
            temperature: OptimalBand::temperature(),
            thresholds: GradeThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Validate all bands and thresholds
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.soil.validate("soil")?;
        self.air_humidity.validate("air_humidity")?;
        self.temperature.validate("temperature")?;

        let GradeThresholds { good, warn } = self.thresholds;
        if !good.is_finite() {
            return Err(ConfigError::NonFinite {
                band: "thresholds",
                param: "good",
            });
        }
        if !warn.is_finite() {
            return Err(ConfigError::NonFinite {
                band: "thresholds",
                param: "warn",
            });
        }
        if warn > good {
            return Err(ConfigError::ThresholdOrder { warn, good });
        }

        Ok(())
    }
}
