//! XML row export commands

use crate::error::Result;
use crate::services::ExportService;
use crate::state::AppState;

/// History entries as `<row .../>` elements
pub fn export_history_rows(state: &AppState) -> Result<Vec<String>> {
    let db = state.read_db();
    Ok(ExportService::history_rows(&db, state.config.quote_escape))
}

/// Securities as `<row .../>` elements
pub fn export_security_rows(state: &AppState) -> Result<Vec<String>> {
    let db = state.read_db();
    Ok(ExportService::security_rows(&db, state.config.quote_escape))
}
