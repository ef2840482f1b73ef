//! Shell commands
//!
//! Entry points the desktop shell calls with file handles and column names.
//! Every command returns a serializable result or an [`AppError`](crate::error::AppError)
//! that serializes to an `ErrorResponse`.

pub mod ingest;
pub mod history;
pub mod export;
