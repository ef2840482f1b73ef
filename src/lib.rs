//! MOEX Viewer - security reference data and trading history browser
//!
//! Reads Moscow Exchange ISS XML exports (securities and trading history),
//! joins history rows to their securities by `secid` and serves the joined
//! rows to a desktop table view.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod state;
pub mod xml;

pub use config::ViewerConfig;
pub use db::{Database, HistoryEntry, JoinedRow, Security};
pub use error::{AppError, ErrorResponse, Result};
pub use state::AppState;
pub use xml::{AttrValue, ColumnType, DataKind, ParsedDocument, Record, RecordParser};

use std::path::Path;

/// Initialize logging and application state for a desktop shell
pub fn init(config_path: &Path) -> Result<AppState> {
    let state = AppState::from_config_file(config_path)?;
    logging::init_logging(&state.config);

    tracing::info!("Starting MOEX Viewer...");
    Ok(state)
}
