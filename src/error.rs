//! Application error types

use crate::xml::value::ColumnType;
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unrecognized data kind in {source_name}: {kind:?}")]
    UnrecognizedDataKind { source_name: String, kind: String },

    #[error("Type coercion error in {source_name}: column '{column}' value {value:?} is not a valid {expected}")]
    TypeCoercion {
        source_name: String,
        column: String,
        value: String,
        expected: ColumnType,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable code used by the shell to pick an alert
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MalformedInput(_) => "MALFORMED_INPUT",
            AppError::UnrecognizedDataKind { .. } => "UNRECOGNIZED_DATA_KIND",
            AppError::TypeCoercion { .. } => "TYPE_COERCION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
        }
    }

    /// Short headline for an alert dialog
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "File not found",
            AppError::MalformedInput(_)
            | AppError::UnrecognizedDataKind { .. }
            | AppError::TypeCoercion { .. }
            | AppError::Validation(_) => "Unable to read file",
            AppError::Config(_) => "Invalid configuration",
            AppError::Serialization(_) | AppError::Io(_) => "Unexpected error",
        }
    }
}

/// Serializable error response for frontend
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub title: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            title: err.user_message().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        ErrorResponse::from(&err)
    }
}

// Allow AppError to be returned from shell commands
impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        ErrorResponse::from(self).serialize(serializer)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
