//! Services Layer
//!
//! Business logic called by the shell commands and usable directly.
//!
//! # Architecture
//!
//! ```text
//! Desktop shell --> Commands --> Services --> Database / RecordParser
//! ```
//!
//! # Services
//!
//! - `IngestService` - Parse XML exports and route them into the database
//! - `HistoryService` - Joined history rows and table columns
//! - `ExportService` - Render stored rows as XML row elements

pub mod ingest_service;
pub mod history_service;
pub mod export_service;

pub use ingest_service::{DocumentFailure, IngestService, IngestSummary, ParsedBatch};
pub use history_service::{HistoryService, TableColumn};
pub use export_service::ExportService;
