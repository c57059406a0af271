//! Schema bootstrap

use crate::StorageError;
use sqlx::SqlitePool;
use tracing::debug;

const CREATE_SENSOR_DATA: &str = r#"
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        soil_moisture REAL,
        air_temperature REAL,
        air_humidity REAL,
        light_intensity REAL,
        water_level REAL,
        composite_score REAL NOT NULL
    )
"#;

const CREATE_IMAGE_CAPTURE: &str = r#"
    CREATE TABLE IF NOT EXISTS image_capture (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        file_path TEXT NOT NULL
    )
"#;

const CREATE_AI_RESULT: &str = r#"
    CREATE TABLE IF NOT EXISTS ai_result (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_id INTEGER NOT NULL REFERENCES image_capture(id),
        ripeness_score REAL,
        ripeness_text TEXT,
        flower_count INTEGER,
        flower_text TEXT
    )
"#;

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_sensor_data_timestamp ON sensor_data(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_image_capture_file_path ON image_capture(file_path)",
    "CREATE INDEX IF NOT EXISTS idx_ai_result_image_id ON ai_result(image_id)",
];

/// Create tables and indexes if they do not exist yet
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<(), StorageError> {
    for statement in [CREATE_SENSOR_DATA, CREATE_IMAGE_CAPTURE, CREATE_AI_RESULT]
        .into_iter()
        .chain(CREATE_INDEXES)
    {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StorageError::persistence("bootstrap schema"))?;
    }

    debug!("Schema bootstrap complete");
    Ok(())
}
