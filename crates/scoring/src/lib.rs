//! Sensor Scoring Engine
//!
//! Converts raw environmental readings into a normalized 0-100 quality signal
//! using triangular "optimal band" responses, and averages the soil, air
//! humidity and temperature scores into a composite.

mod config;
mod engine;

pub use config::{GradeThresholds, OptimalBand, ScoringConfig};
pub use engine::{
    air_score, composite, peak_score, soil_score, temp_score, Grade, ScoreBreakdown,
    ScoringEngine,
};

use thiserror::Error;

/// Errors raised when a scoring configuration is not usable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A band parameter is NaN or infinite
    #[error("{band}: {param} must be finite")]
    NonFinite {
        band: &'static str,
        param: &'static str,
    },

    /// Half-width must be strictly positive
    #[error("{band}: half_width {half_width} must be > 0")]
    InvalidHalfWidth { band: &'static str, half_width: f64 },

    /// Domain bounds are inverted or empty
    #[error("{band}: domain [{min}, {max}] is empty")]
    EmptyDomain {
        band: &'static str,
        min: f64,
        max: f64,
    },

    /// Optimal point lies outside the admissible domain
    #[error("{band}: center {center} is outside ({min}, {max})")]
    CenterOutOfDomain {
        band: &'static str,
        center: f64,
        min: f64,
        max: f64,
    },

    /// Warn threshold above good threshold
    #[error("grade thresholds out of order: warn {warn} > good {good}")]
    ThresholdOrder { warn: f64, good: f64 },
}
