//! Stored record types

use chrono::NaiveDateTime;
use data_validator::SensorValues;
use serde::{Deserialize, Serialize};

/// Timestamps are exchanged as `YYYY-MM-DD HH:MM:SS`, the same text the
/// store generates for defaulted rows.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One row of `sensor_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorReading {
    pub id: i64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub soil_moisture: Option<f64>,
    pub air_temperature: Option<f64>,
    pub air_humidity: Option<f64>,
    pub light_intensity: Option<f64>,
    pub water_level: Option<f64>,
    pub composite_score: f64,
}

/// Reading to be written; the composite score is always computed on write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSensorReading {
    pub values: SensorValues,
    /// Explicit capture time; the store's clock is used when absent
    pub timestamp: Option<NaiveDateTime>,
}

impl NewSensorReading {
    /// Create a reading stamped at write time
    pub fn new(values: SensorValues) -> Self {
        Self {
            values,
            timestamp: None,
        }
    }

    /// Set an explicit capture time
    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Image capture plus its analysis, written as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAnalysis {
    /// Location the caller used when producing the image
    pub file_path: String,
    pub ripeness_score: Option<f64>,
    pub ripeness_text: Option<String>,
    pub flower_count: Option<i64>,
    pub flower_text: Option<String>,
}

/// Generated ids of a committed image/result pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAnalysis {
    pub image_id: i64,
    pub ai_result_id: i64,
}

/// Joined image capture and analysis row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalysisRecord {
    /// Image capture id
    pub id: i64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub file_path: String,
    pub ripeness_text: Option<String>,
    pub ripeness_score: Option<f64>,
    pub flower_count: Option<i64>,
    pub flower_text: Option<String>,
}
