//! Smart Farm API Server
//!
//! HTTP ingestion for field sensors and camera captures, plus query
//! endpoints for the web dashboard and the mobile app.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use scoring::ScoringEngine;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use storage::{AnalysisRepository, Database, SensorRepository};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use vision::{HeuristicAnalyzer, ImageAnalyzer};

mod config;
mod error;
mod routes;
mod upload;

pub use config::{AppConfig, AppConfigError, LogConfig, ServerConfig, DEFAULT_CONFIG_FILE};
pub use error::ApiError;
pub use upload::TempUpload;

/// Application state shared across handlers
pub struct AppState {
    /// Sensor reading repository
    pub sensors: SensorRepository,
    /// Image analysis repository
    pub analyses: AnalysisRepository,
    /// Image analyzer
    pub analyzer: Arc<dyn ImageAnalyzer>,
    /// Absolute directory for uploaded images
    pub upload_dir: PathBuf,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    ///
    /// Creates the upload directory if needed and resolves it to an absolute
    /// path, which is what gets recorded for each capture.
    pub fn new(
        db: Database,
        scoring: ScoringEngine,
        analyzer: Arc<dyn ImageAnalyzer>,
        server: &ServerConfig,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(&server.upload_dir)?;
        let upload_dir = std::fs::canonicalize(&server.upload_dir)?;
        info!("Upload directory: {}", upload_dir.display());

        Ok(Self {
            sensors: SensorRepository::new(db.clone(), scoring),
            analyses: AnalysisRepository::new(db),
            analyzer,
            upload_dir,
            max_upload_bytes: server.max_upload_bytes,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        })
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: StoreMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub error: Option<String>,
}

/// Row counts
#[derive(Debug, Serialize)]
pub struct StoreMetrics {
    pub sensor_count: i64,
    pub analysis_count: i64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    let android = Router::new()
        .route("/ping", get(routes::android::ping))
        .route("/sensor/latest", get(routes::android::sensor_latest))
        .route("/sensor", post(routes::android::sensor_post))
        .route("/ai", post(routes::android::analyze_image));

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/sensor", post(routes::sensors::receive))
        .route("/api/latest_data", get(routes::sensors::get_latest))
        .route("/api/latest_sensor_data", get(routes::sensors::get_latest))
        .route("/api/sensor_data", get(routes::sensors::get_history))
        .route("/camera/callback", post(routes::analysis::camera_callback))
        .route("/api/analysis", get(routes::analysis::get_analysis))
        .route("/metrics", get(metrics_handler))
        .nest("/android", android)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let counts = match (state.sensors.count().await, state.analyses.count().await) {
        (Ok(sensors), Ok(analyses)) => Ok((sensors, analyses)),
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    let (status, database, metrics) = match counts {
        Ok((sensor_count, analysis_count)) => (
            "healthy",
            ComponentHealth {
                status: "ok".to_string(),
                error: None,
            },
            StoreMetrics {
                sensor_count,
                analysis_count,
            },
        ),
        Err(e) => {
            warn!("Health check could not query the database: {}", e);
            (
                "degraded",
                ComponentHealth {
                    status: "error".to_string(),
                    error: Some(e.to_string()),
                },
                StoreMetrics {
                    sensor_count: 0,
                    analysis_count: 0,
                },
            )
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { database },
        metrics,
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Initialize logging
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level: Level = config.level.parse()?;

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| e as Box<dyn std::error::Error>)
}

/// Run the server until Ctrl-C
pub async fn run_server(
    config: AppConfig,
    metrics: Option<PrometheusHandle>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.storage).await?;
    let analyzer: Arc<dyn ImageAnalyzer> = Arc::new(HeuristicAnalyzer::new(config.vision.clone()));

    let mut state = AppState::new(
        db.clone(),
        ScoringEngine::new(config.scoring.clone()),
        analyzer,
        &config.server,
    )?;
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    info!("Server stopped, closing database");
    db.close().await;

    Ok(())
}
