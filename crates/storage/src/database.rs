//! Connection provider

use crate::{schema, StorageError};
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Store location and connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Upper bound on concurrently open connections
    pub max_connections: u32,
    /// How long a writer waits on a locked database (milliseconds)
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("farm.db"),
            max_connections: 8,
            busy_timeout_ms: 5000,
        }
    }
}

/// Handle to the relational store
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Arc<PathBuf>,
}

impl Database {
    /// Open (or create) the database and bootstrap the schema
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let newly_created = !config.db_path.exists();

        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(StorageError::persistence("open database"))?;

        schema::bootstrap(&pool).await?;

        if newly_created {
            info!("Initialized new database: {}", config.db_path.display());
        } else {
            info!("Opened existing database: {}", config.db_path.display());
        }

        Ok(Self {
            pool,
            path: Arc::new(config.db_path.clone()),
        })
    }

    /// Acquire a connection for the duration of one call
    ///
    /// The connection returns to the pool when the guard is dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, StorageError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(StorageError::persistence("acquire connection"))?;
        debug!("Connection acquired");
        Ok(conn)
    }

    /// Begin a transaction on a dedicated connection
    ///
    /// Dropping the transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StorageError> {
        self.pool
            .begin()
            .await
            .map_err(StorageError::persistence("begin transaction"))
    }

    /// Underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Close all connections
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database closed: {}", self.path.display());
    }
}
