//! Sensor ingestion payloads

use crate::coerce::optional_number;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Field names accepted for a sensor reading, in storage order
pub const SENSOR_FIELDS: [&str; 5] = [
    "soil_moisture",
    "air_temperature",
    "air_humidity",
    "light_intensity",
    "water_level",
];

/// Raw sensor payload as sent by field devices
///
/// Every field may be missing, `null`, a number, or a numeric string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorInput {
    pub soil_moisture: Value,
    pub air_temperature: Value,
    pub air_humidity: Value,
    pub light_intensity: Value,
    pub water_level: Value,
}

impl SensorInput {
    /// Validate and coerce every field
    pub fn validate(&self) -> Result<SensorValues, ValidationError> {
        let values = SensorValues {
            soil_moisture: optional_number("soil_moisture", &self.soil_moisture)?,
            air_temperature: optional_number("air_temperature", &self.air_temperature)?,
            air_humidity: optional_number("air_humidity", &self.air_humidity)?,
            light_intensity: optional_number("light_intensity", &self.light_intensity)?,
            water_level: optional_number("water_level", &self.water_level)?,
        };
        debug!("Validated sensor input: {:?}", values);
        Ok(values)
    }
}

/// Strictly-typed sensor values; `None` means the metric was not reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorValues {
    pub soil_moisture: Option<f64>,
    pub air_temperature: Option<f64>,
    pub air_humidity: Option<f64>,
    pub light_intensity: Option<f64>,
    pub water_level: Option<f64>,
}

impl From<SensorValues> for SensorInput {
    fn from(values: SensorValues) -> Self {
        let to_value = |v: Option<f64>| v.map(Value::from).unwrap_or(Value::Null);
        Self {
            soil_moisture: to_value(values.soil_moisture),
            air_temperature: to_value(values.air_temperature),
            air_humidity: to_value(values.air_humidity),
            light_intensity: to_value(values.light_intensity),
            water_level: to_value(values.water_level),
        }
    }
}
