//! Ingest Service
//!
//! Routes parsed documents into the database by their declared data kind.
//! Called by the ingest command and usable directly from code.

use crate::config::BatchErrorPolicy;
use crate::db::{Database, Security};
use crate::error::{AppError, Result};
use crate::xml::{DataKind, ParsedDocument, RecordParser};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A document that was skipped under [`BatchErrorPolicy::SkipDocument`]
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub source: String,
    pub code: String,
    pub message: String,
}

/// Files read by [`IngestService::parse_paths`], not yet merged
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub documents: Vec<ParsedDocument>,
    /// Files skipped under [`BatchErrorPolicy::SkipDocument`]
    pub failures: Vec<DocumentFailure>,
}

/// Outcome of one ingestion batch
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub batch_id: Uuid,
    pub documents: usize,
    pub securities_upserted: usize,
    pub history_added: usize,
    pub history_dropped: usize,
    pub failures: Vec<DocumentFailure>,
}

impl IngestSummary {
    fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            documents: 0,
            securities_upserted: 0,
            history_added: 0,
            history_dropped: 0,
            failures: Vec::new(),
        }
    }
}

/// Ingestion coordinator
pub struct IngestService;

impl IngestService {
    /// Parse every path, then merge the documents in the given order.
    ///
    /// With [`BatchErrorPolicy::AbortBatch`] the first failing document fails
    /// the call before anything is merged.
    pub fn ingest_paths<P: AsRef<Path>>(
        db: &mut Database,
        paths: &[P],
        policy: BatchErrorPolicy,
    ) -> Result<IngestSummary> {
        let parsed = Self::parse_paths(paths, policy)?;
        Self::ingest_parsed(db, parsed, policy)
    }

    /// Merge the output of [`Self::parse_paths`], keeping its read failures
    /// ahead of any routing failures in the summary
    pub fn ingest_parsed(
        db: &mut Database,
        batch: ParsedBatch,
        policy: BatchErrorPolicy,
    ) -> Result<IngestSummary> {
        let ParsedBatch {
            documents,
            mut failures,
        } = batch;
        let mut summary = Self::ingest_documents(db, documents, policy)?;
        failures.append(&mut summary.failures);
        summary.failures = failures;
        Ok(summary)
    }

    /// Parse every path without touching any database
    pub fn parse_paths<P: AsRef<Path>>(
        paths: &[P],
        policy: BatchErrorPolicy,
    ) -> Result<ParsedBatch> {
        let mut batch = ParsedBatch {
            documents: Vec::with_capacity(paths.len()),
            failures: Vec::new(),
        };

        for path in paths {
            let path = path.as_ref();
            match RecordParser::parse_file(path) {
                Ok(document) => batch.documents.push(document),
                Err(e) => match policy {
                    BatchErrorPolicy::AbortBatch => {
                        error!("Aborting batch, failed to read {:?}: {}", path, e);
                        return Err(e);
                    }
                    BatchErrorPolicy::SkipDocument => {
                        warn!("Skipping {:?}: {}", path, e);
                        batch.failures.push(DocumentFailure {
                            source: path.display().to_string(),
                            code: e.code().to_string(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(batch)
    }

    /// Merge parsed documents in order and re-sort history once at the end
    pub fn ingest_documents<I>(
        db: &mut Database,
        documents: I,
        policy: BatchErrorPolicy,
    ) -> Result<IngestSummary>
    where
        I: IntoIterator<Item = ParsedDocument>,
    {
        let documents: Vec<ParsedDocument> = documents.into_iter().collect();
        let mut summary = IngestSummary::new();

        // Securities rows are validated per document before anything is written
        let mut prepared = Vec::with_capacity(documents.len());
        for document in documents {
            match Self::prepare(document) {
                Ok(batch) => prepared.push(batch),
                Err((source, e)) => match policy {
                    BatchErrorPolicy::AbortBatch => {
                        error!("Aborting batch, {} rejected: {}", source, e);
                        return Err(e);
                    }
                    BatchErrorPolicy::SkipDocument => {
                        warn!("Skipping {}: {}", source, e);
                        summary.failures.push(DocumentFailure {
                            source,
                            code: e.code().to_string(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        for batch in prepared {
            summary.documents += 1;
            match batch {
                Prepared::Securities { source, securities } => {
                    let count = db.register_securities(securities);
                    summary.securities_upserted += count;
                    info!("Loaded {} securities from {}", count, source);
                }
                Prepared::History(document) => {
                    let source = document.source.clone();
                    let (added, dropped) = Self::merge_history(db, document);
                    summary.history_added += added;
                    summary.history_dropped += dropped;
                    info!(
                        "Loaded {} history entries from {} ({} without known security)",
                        added, source, dropped
                    );
                }
            }
        }

        db.sort_histories();

        info!(
            "Batch {} done: {} documents, {} securities, {} history entries, {} failures",
            summary.batch_id,
            summary.documents,
            summary.securities_upserted,
            summary.history_added,
            summary.failures.len()
        );

        Ok(summary)
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    fn prepare(document: ParsedDocument) -> std::result::Result<Prepared, (String, AppError)> {
        match document.kind {
            DataKind::Securities => {
                let source = document.source;
                let securities = document
                    .records
                    .into_iter()
                    .enumerate()
                    .map(|(row, record)| {
                        Security::from_record(record).map_err(|e| match e {
                            AppError::Validation(message) => AppError::Validation(format!(
                                "{}: row {}: {}",
                                source,
                                row + 1,
                                message
                            )),
                            other => other,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| (source.clone(), e))?;
                Ok(Prepared::Securities { source, securities })
            }
            DataKind::History => Ok(Prepared::History(document)),
        }
    }

    fn merge_history(db: &mut Database, document: ParsedDocument) -> (usize, usize) {
        let mut added = 0;
        let mut dropped = 0;

        for record in document.records {
            let Some(secid) = record.secid() else {
                debug!("Dropping history row without secid");
                dropped += 1;
                continue;
            };

            match db.create_history_entry(&secid, record.into_attributes()) {
                Some(entry) => {
                    db.append_history(entry);
                    added += 1;
                }
                None => {
                    debug!("Dropping history row for unknown secid {}", secid);
                    dropped += 1;
                }
            }
        }

        (added, dropped)
    }
}

enum Prepared {
    Securities {
        source: String,
        securities: Vec<Security>,
    },
    History(ParsedDocument),
}
