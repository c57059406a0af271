//! Sensor reading repository

use crate::models::{NewSensorReading, SensorReading};
use crate::{Database, StorageError};
use data_validator::{SensorInput, SensorValues, ValidationError};
use scoring::ScoringEngine;
use tracing::{debug, info};

const SELECT_READINGS: &str = r#"
    SELECT id, timestamp, soil_moisture, air_temperature, air_humidity,
           light_intensity, water_level, composite_score
    FROM sensor_data
    ORDER BY timestamp DESC, id DESC
"#;

/// Repository for `sensor_data`
#[derive(Debug, Clone)]
pub struct SensorRepository {
    db: Database,
    scoring: ScoringEngine,
}

impl SensorRepository {
    /// Create a repository scoring readings with the given engine
    pub fn new(db: Database, scoring: ScoringEngine) -> Self {
        Self { db, scoring }
    }

    /// Scoring engine applied on write
    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Validate a loosely-typed payload and store it
    ///
    /// Returns the generated row id. Input is rejected before any store
    /// access when a present value is not numeric.
    pub async fn save(&self, input: &SensorInput) -> Result<i64, StorageError> {
        let values = input.validate()?;
        self.save_reading(&NewSensorReading::new(values)).await
    }

    /// Store an already-typed reading
    pub async fn save_reading(&self, reading: &NewSensorReading) -> Result<i64, StorageError> {
        ensure_finite(&reading.values)?;

        let v = &reading.values;
        let composite = self
            .scoring
            .composite(v.soil_moisture, v.air_humidity, v.air_temperature);

        let mut conn = self.db.acquire().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO sensor_data (
                timestamp, soil_moisture, air_temperature, air_humidity,
                light_intensity, water_level, composite_score
            )
            VALUES (COALESCE(?, CURRENT_TIMESTAMP), ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp)
        .bind(v.soil_moisture)
        .bind(v.air_temperature)
        .bind(v.air_humidity)
        .bind(v.light_intensity)
        .bind(v.water_level)
        .bind(composite)
        .execute(&mut *conn)
        .await
        .map_err(StorageError::persistence("insert sensor reading"))?;

        let id = result.last_insert_rowid();
        info!("Saved sensor reading {} (composite {:.2})", id, composite);
        Ok(id)
    }

    /// Most recent reading, or `None` when nothing has been stored
    pub async fn get_latest(&self) -> Result<Option<SensorReading>, StorageError> {
        let mut conn = self.db.acquire().await?;
        let query = format!("{SELECT_READINGS} LIMIT 1");
        let latest = sqlx::query_as::<_, SensorReading>(&query)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StorageError::persistence("select latest sensor reading"))?;
        Ok(latest)
    }

    /// Full history, newest first
    pub async fn get_all(&self) -> Result<Vec<SensorReading>, StorageError> {
        let mut conn = self.db.acquire().await?;
        let readings = sqlx::query_as::<_, SensorReading>(SELECT_READINGS)
            .fetch_all(&mut *conn)
            .await
            .map_err(StorageError::persistence("select sensor readings"))?;
        debug!("Loaded {} sensor readings", readings.len());
        Ok(readings)
    }

    /// Number of stored readings
    pub async fn count(&self) -> Result<i64, StorageError> {
        let mut conn = self.db.acquire().await?;
        sqlx::query_scalar("SELECT COUNT(*) FROM sensor_data")
            .fetch_one(&mut *conn)
            .await
            .map_err(StorageError::persistence("count sensor readings"))
    }
}

fn ensure_finite(values: &SensorValues) -> Result<(), ValidationError> {
    let fields = [
        ("soil_moisture", values.soil_moisture),
        ("air_temperature", values.air_temperature),
        ("air_humidity", values.air_humidity),
        ("light_intensity", values.light_intensity),
        ("water_level", values.water_level),
    ];
    for (field, value) in fields {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite { field });
        }
    }
    Ok(())
}
