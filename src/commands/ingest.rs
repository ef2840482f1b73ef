//! File ingestion commands

use crate::error::Result;
use crate::services::{IngestService, IngestSummary};
use crate::state::AppState;
use std::path::PathBuf;

/// Ingest the XML files picked by the user
///
/// Files are parsed before the database lock is taken; the whole batch is
/// then merged under one write lock.
pub fn ingest_files(state: &AppState, paths: Vec<PathBuf>) -> Result<IngestSummary> {
    tracing::info!("Ingesting {} file(s)", paths.len());

    let policy = state.config.on_error;
    let parsed = IngestService::parse_paths(&paths, policy)?;

    let mut db = state.write_db();
    IngestService::ingest_parsed(&mut db, parsed, policy)
}
