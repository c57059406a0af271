//! Peak scoring and composite computation

use crate::config::{OptimalBand, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Round the exact value to two decimal places, with no intermediate
/// `value * 100.0` product
fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Triangular peak score in `[0, 100]`
///
/// Returns 0 for an absent or non-finite value, for a value at or outside
/// `[min_x, max_x]`, and for a value whose distance from `center` is at least
/// `half_width`. Otherwise returns `100 * (1 - distance / half_width)`,
/// clamped and rounded to two decimals. The domain check always runs before
/// the half-width check.
pub fn peak_score(x: Option<f64>, center: f64, half_width: f64, min_x: f64, max_x: f64) -> f64 {
    let x = match x {
        Some(x) if x.is_finite() => x,
        _ => return 0.0,
    };

    if x <= min_x || x >= max_x {
        return 0.0;
    }

    let distance = (x - center).abs();
    if distance >= half_width {
        return 0.0;
    }

    let score = (100.0 * (1.0 - distance / half_width)).clamp(0.0, 100.0);
    round2(score)
}

impl OptimalBand {
    /// Score a value against this band
    pub fn score(&self, x: Option<f64>) -> f64 {
        peak_score(x, self.center, self.half_width, self.min, self.max)
    }
}

/// Soil moisture score with the default band
pub fn soil_score(value: Option<f64>) -> f64 {
    OptimalBand::soil().score(value)
}

/// Air humidity score with the default band
pub fn air_score(value: Option<f64>) -> f64 {
    OptimalBand::air_humidity().score(value)
}

/// Air temperature score with the default band
pub fn temp_score(value: Option<f64>) -> f64 {
    OptimalBand::temperature().score(value)
}

/// Composite score with the default bands
pub fn composite(soil: Option<f64>, air_humidity: Option<f64>, temp: Option<f64>) -> f64 {
    ScoringEngine::default().composite(soil, air_humidity, temp)
}

/// Quality grade of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Good,
    Warn,
    Poor,
}

impl Grade {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Good => "good",
            Grade::Warn => "warn",
            Grade::Poor => "poor",
        }
    }
}

/// Per-metric scores alongside the composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub soil: f64,
    pub air_humidity: f64,
    pub temperature: f64,
    pub composite: f64,
}

/// Scoring engine bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create a new scoring engine with given config
    pub fn new(config: ScoringConfig) -> Self {
        debug!("Creating scoring engine with config: {:?}", config);
        Self { config }
    }

    /// Get the active configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Soil moisture score
    pub fn soil_score(&self, value: Option<f64>) -> f64 {
        self.config.soil.score(value)
    }

    /// Air humidity score
    pub fn air_score(&self, value: Option<f64>) -> f64 {
        self.config.air_humidity.score(value)
    }

    /// Air temperature score
    pub fn temp_score(&self, value: Option<f64>) -> f64 {
        self.config.temperature.score(value)
    }

    /// Score every metric and the composite in one pass
    pub fn breakdown(
        &self,
        soil: Option<f64>,
        air_humidity: Option<f64>,
        temp: Option<f64>,
    ) -> ScoreBreakdown {
        let soil = self.soil_score(soil);
        let air_humidity = self.air_score(air_humidity);
        let temperature = self.temp_score(temp);

        // Absent metrics score 0 and still count toward the mean
        let composite = round2((soil + air_humidity + temperature) / 3.0);

        ScoreBreakdown {
            soil,
            air_humidity,
            temperature,
            composite,
        }
    }

    /// Unweighted mean of the three metric scores, rounded to two decimals
    pub fn composite(
        &self,
        soil: Option<f64>,
        air_humidity: Option<f64>,
        temp: Option<f64>,
    ) -> f64 {
        self.breakdown(soil, air_humidity, temp).composite
    }

    /// Grade a composite score against the configured thresholds
    pub fn grade(&self, composite: f64) -> Grade {
        let thresholds = &self.config.thresholds;
        if composite >= thresholds.good {
            Grade::Good
        } else if composite >= thresholds.warn {
            Grade::Warn
        } else {
            Grade::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GradeThresholds;
    use proptest::prelude::*;

    #[test]
    fn test_absent_scores_zero() {
        assert_eq!(peak_score(None, 45.0, 10.0, 0.0, 100.0), 0.0);
        assert_eq!(soil_score(None), 0.0);
        assert_eq!(air_score(None), 0.0);
        assert_eq!(temp_score(None), 0.0);
    }

    #[test]
    fn test_center_scores_hundred() {
        assert_eq!(soil_score(Some(45.0)), 100.0);
        assert_eq!(air_score(Some(60.0)), 100.0);
        assert_eq!(temp_score(Some(24.0)), 100.0);
    }

    #[test]
    fn test_rounds_exact_value_to_two_decimals() {
        // 43.004999999999995 and 98.52499999999999 before rounding
        assert_eq!(soil_score(Some(39.3005)), 43.0);
        assert_eq!(soil_score(Some(44.8525)), 98.52);
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_domain_bounds_are_exclusive() {
        assert_eq!(soil_score(Some(0.0)), 0.0);
        assert_eq!(soil_score(Some(100.0)), 0.0);
        assert_eq!(temp_score(Some(5.0)), 0.0);
        assert_eq!(temp_score(Some(40.0)), 0.0);
        assert_eq!(temp_score(Some(-3.0)), 0.0);
        assert_eq!(air_score(Some(250.0)), 0.0);
    }

    #[test]
    fn test_half_width_boundary_is_exclusive() {
        assert_eq!(soil_score(Some(35.0)), 0.0);
        assert_eq!(soil_score(Some(55.0)), 0.0);
        assert_eq!(temp_score(Some(18.0)), 0.0);
        assert_eq!(temp_score(Some(30.0)), 0.0);
        assert!(soil_score(Some(35.01)) > 0.0);
    }

    #[test]
    fn test_linear_falloff() {
        assert_eq!(soil_score(Some(50.0)), 50.0);
        assert_eq!(soil_score(Some(40.0)), 50.0);
        assert_eq!(air_score(Some(62.5)), 75.0);
        assert_eq!(temp_score(Some(27.0)), 50.0);
        assert_eq!(temp_score(Some(22.0)), 66.67);
    }

    #[test]
    fn test_domain_checked_before_half_width() {
        // Wide band whose half-width reaches past the domain: the domain
        // bound still zeroes the score.
        assert_eq!(peak_score(Some(10.0), 12.0, 50.0, 10.0, 20.0), 0.0);
        assert_eq!(peak_score(Some(10.5), 12.0, 50.0, 10.0, 20.0), 97.0);
    }

    #[test]
    fn test_non_finite_scores_zero() {
        assert_eq!(soil_score(Some(f64::NAN)), 0.0);
        assert_eq!(soil_score(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_composite_optimal() {
        assert_eq!(composite(Some(45.0), Some(60.0), Some(24.0)), 100.0);
    }

    #[test]
    fn test_composite_all_absent() {
        assert_eq!(composite(None, None, None), 0.0);
    }

    #[test]
    fn test_composite_counts_absent_metrics() {
        // Mean over all three metrics, not only the present ones
        assert_eq!(composite(Some(45.0), None, None), 33.33);
        assert_eq!(composite(Some(45.0), Some(60.0), None), 66.67);
    }

    #[test]
    fn test_breakdown() {
        let engine = ScoringEngine::default();
        let b = engine.breakdown(Some(50.0), Some(65.0), Some(27.0));
        assert_eq!(b.soil, 50.0);
        assert_eq!(b.air_humidity, 50.0);
        assert_eq!(b.temperature, 50.0);
        assert_eq!(b.composite, 50.0);
    }

    #[test]
    fn test_custom_config() {
        let engine = ScoringEngine::new(ScoringConfig {
            soil: OptimalBand::new(30.0, 20.0, 0.0, 100.0),
            ..Default::default()
        });
        assert_eq!(engine.soil_score(Some(40.0)), 50.0);
        assert_eq!(engine.soil_score(Some(45.0)), 25.0);
    }

    #[test]
    fn test_grade() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.grade(100.0), Grade::Good);
        assert_eq!(engine.grade(80.0), Grade::Good);
        assert_eq!(engine.grade(79.99), Grade::Warn);
        assert_eq!(engine.grade(50.0), Grade::Warn);
        assert_eq!(engine.grade(49.99), Grade::Poor);
        assert_eq!(engine.grade(0.0), Grade::Poor);

        let strict = ScoringEngine::new(ScoringConfig {
            thresholds: GradeThresholds {
                good: 95.0,
                warn: 90.0,
            },
            ..Default::default()
        });
        assert_eq!(strict.grade(92.0), Grade::Warn);
    }

    fn bands() -> impl Strategy<Value = OptimalBand> {
        prop_oneof![
            Just(OptimalBand::soil()),
            Just(OptimalBand::air_humidity()),
            Just(OptimalBand::temperature()),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_in_range(band in bands(), x in -100.0f64..200.0) {
            let s = band.score(Some(x));
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn prop_zero_outside_domain(band in bands(), offset in 0.0f64..500.0) {
            prop_assert_eq!(band.score(Some(band.min - offset)), 0.0);
            prop_assert_eq!(band.score(Some(band.max + offset)), 0.0);
        }

        #[test]
        fn prop_symmetric(band in bands(), frac in 0.0f64..1.5) {
            let d = band.half_width * frac;
            let below = band.score(Some(band.center - d));
            let above = band.score(Some(band.center + d));
            prop_assert!((below - above).abs() <= 0.011);
        }

        #[test]
        fn prop_non_increasing_with_distance(
            band in bands(),
            a in 0.0f64..1.5,
            b in 0.0f64..1.5,
        ) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let s_near = band.score(Some(band.center + band.half_width * near));
            let s_far = band.score(Some(band.center + band.half_width * far));
            prop_assert!(s_near >= s_far);
        }

        #[test]
        fn prop_composite_is_mean(
            soil in proptest::option::of(0.0f64..100.0),
            air in proptest::option::of(0.0f64..100.0),
            temp in proptest::option::of(0.0f64..45.0),
        ) {
            let expected = (soil_score(soil) + air_score(air) + temp_score(temp)) / 3.0;
            let c = composite(soil, air, temp);
            prop_assert!((c - expected).abs() <= 0.005 + 1e-9);
            prop_assert!((0.0..=100.0).contains(&c));
        }
    }
}
