//! Smart Farm Server - Main Entry Point
//!
//! Usage: `smartfarm-server [CONFIG_FILE]`

use api::{init_logging, run_server, AppConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    init_logging(&config.log)?;

    info!("=== Smart Farm Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.storage.db_path.display());

    let metrics = PrometheusBuilder::new().install_recorder()?;

    run_server(config, Some(metrics)).await
}
