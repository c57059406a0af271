//! Cross-table consistency and concurrent access against a real SQLite file

use data_validator::{SensorInput, SensorValues};
use scoring::ScoringEngine;
use storage::{
    AnalysisRepository, Database, NewAnalysis, SensorRepository, StorageConfig, StorageError,
    DEFAULT_ANALYSIS_LIMIT,
};
use tempfile::TempDir;

async fn open(max_connections: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        db_path: dir.path().join("farm.db"),
        max_connections,
        ..Default::default()
    };
    let db = Database::connect(&config).await.unwrap();
    (dir, db)
}

fn analysis(path: &str) -> NewAnalysis {
    NewAnalysis {
        file_path: path.to_string(),
        ripeness_score: Some(72.0),
        ripeness_text: Some("turning".to_string()),
        flower_count: Some(2),
        flower_text: Some("2 flowers".to_string()),
    }
}

async fn table_count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_failure_between_inserts_leaves_no_trace() {
    let (_dir, db) = open(4).await;
    let repo = AnalysisRepository::new(db.clone());

    let kept = repo.save_analysis(&analysis("/data/before.jpg")).await.unwrap();

    // Abort any ai_result insert: the image_capture insert of the same
    // transaction has already happened when this fires.
    sqlx::query(
        "CREATE TRIGGER fail_ai_result BEFORE INSERT ON ai_result \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = repo
        .save_analysis(&analysis("/data/failed.jpg"))
        .await
        .unwrap_err();
    match &err {
        StorageError::Persistence { operation, source } => {
            assert_eq!(*operation, "insert ai result");
            assert!(source.to_string().contains("injected failure"));
        }
        other => panic!("expected persistence error, got {other:?}"),
    }

    assert_eq!(repo.find_image_id_by_path("/data/failed.jpg").await.unwrap(), None);
    let records = repo.get_all_analysis(DEFAULT_ANALYSIS_LIMIT).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, kept.image_id);
    assert_eq!(table_count(&db, "image_capture").await, 1);
    assert_eq!(table_count(&db, "ai_result").await, 1);

    // Store remains usable once the fault is gone
    sqlx::query("DROP TRIGGER fail_ai_result")
        .execute(db.pool())
        .await
        .unwrap();
    let after = repo.save_analysis(&analysis("/data/after.jpg")).await.unwrap();
    assert!(after.image_id > kept.image_id);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_capture_insert_leaves_no_trace() {
    let (_dir, db) = open(4).await;
    let repo = AnalysisRepository::new(db.clone());

    sqlx::query(
        "CREATE TRIGGER fail_capture BEFORE INSERT ON image_capture \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = repo.save_analysis(&analysis("/data/x.jpg")).await.unwrap_err();
    assert!(!err.is_validation());
    assert_eq!(table_count(&db, "image_capture").await, 0);
    assert_eq!(table_count(&db, "ai_result").await, 0);
}

#[tokio::test]
async fn test_sensor_write_failure_is_persistence_error() {
    let (_dir, db) = open(4).await;
    let repo = SensorRepository::new(db.clone(), ScoringEngine::default());

    sqlx::query(
        "CREATE TRIGGER fail_sensor BEFORE INSERT ON sensor_data \
         BEGIN SELECT RAISE(ABORT, 'read-only'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let input = SensorInput::from(SensorValues {
        soil_moisture: Some(45.0),
        ..Default::default()
    });
    let err = repo.save(&input).await.unwrap_err();
    assert!(matches!(err, StorageError::Persistence { .. }));
    assert!(repo.get_latest().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reads_see_pairs_whole() {
    let (_dir, db) = open(4).await;
    let repo = AnalysisRepository::new(db.clone());

    let writer = {
        let repo = repo.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                repo.save_analysis(&analysis(&format!("/data/w_{i}.jpg")))
                    .await
                    .unwrap();
            }
        })
    };

    for _ in 0..20 {
        // One statement reads one snapshot: a capture is never visible
        // without its result.
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM image_capture ic \
             LEFT JOIN ai_result ar ON ar.image_id = ic.id \
             WHERE ar.id IS NULL",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(orphans, 0);
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert_eq!(table_count(&db, "image_capture").await, 20);
    assert_eq!(table_count(&db, "ai_result").await, 20);
    assert_eq!(repo.count().await.unwrap(), 20);
}

#[tokio::test]
async fn test_concurrent_sensor_writers() {
    let (_dir, db) = open(4).await;
    let repo = SensorRepository::new(db, ScoringEngine::default());

    let mut handles = Vec::new();
    for i in 0..16 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let input = SensorInput::from(SensorValues {
                soil_moisture: Some(40.0 + i as f64 * 0.5),
                air_temperature: Some(24.0),
                air_humidity: Some(60.0),
                ..Default::default()
            });
            repo.save(&input).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 16);
    for reading in &all {
        let expected = repo.scoring().composite(
            reading.soil_moisture,
            reading.air_humidity,
            reading.air_temperature,
        );
        assert_eq!(reading.composite_score, expected);
    }
}
