//! Application state management

use crate::config::ViewerConfig;
use crate::db::Database;
use crate::error::Result;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::Path;

/// Application state shared across all commands
pub struct AppState {
    /// Viewer configuration
    pub config: ViewerConfig,

    /// Session database. Ingestion holds the write lock for a whole batch.
    database: RwLock<Database>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            database: RwLock::new(Database::new()),
        })
    }

    /// Load config from an optional file plus environment overrides
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let mut config = ViewerConfig::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded from {:?}", path);
        Self::new(config)
    }

    pub fn read_db(&self) -> RwLockReadGuard<'_, Database> {
        self.database.read()
    }

    pub fn write_db(&self) -> RwLockWriteGuard<'_, Database> {
        self.database.write()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: ViewerConfig::default(),
            database: RwLock::new(Database::new()),
        }
    }
}
