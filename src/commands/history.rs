//! History table commands

use crate::db::{DatabaseStats, JoinedRow};
use crate::error::{AppError, Result};
use crate::services::{HistoryService, TableColumn};
use crate::state::AppState;

/// Joined rows for the history table
///
/// Falls back to the configured display columns when none are given.
pub fn list_joined_rows(state: &AppState, columns: Option<Vec<String>>) -> Result<Vec<JoinedRow>> {
    let columns = resolve_columns(state, columns)?;
    let db = state.read_db();
    Ok(HistoryService::joined_rows(&db, &columns))
}

/// Every attribute of every history entry merged with its security
pub fn list_full_rows(state: &AppState) -> Result<Vec<JoinedRow>> {
    let db = state.read_db();
    Ok(HistoryService::full_rows(&db))
}

/// Column headers for the history table
pub fn get_table_columns(
    state: &AppState,
    columns: Option<Vec<String>>,
) -> Result<Vec<TableColumn>> {
    let columns = resolve_columns(state, columns)?;
    Ok(HistoryService::table_columns(&columns))
}

/// Number of securities and history entries loaded
pub fn get_database_stats(state: &AppState) -> Result<DatabaseStats> {
    let db = state.read_db();
    Ok(HistoryService::stats(&db))
}

fn resolve_columns(state: &AppState, columns: Option<Vec<String>>) -> Result<Vec<String>> {
    match columns {
        None => Ok(state.config.display_columns.clone()),
        Some(columns) if columns.iter().all(|c| c.trim().is_empty()) => {
            Err(AppError::Validation("At least one column is required".to_string()))
        }
        Some(columns) => Ok(columns),
    }
}
