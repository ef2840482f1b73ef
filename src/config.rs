//! Viewer configuration
//!
//! Loaded from an optional JSON file, then overridden from the environment:
//!
//! - `MOEX_VIEWER_LOG` - tracing filter directive
//! - `MOEX_VIEWER_QUOTE_ESCAPE` - `standard` or `legacy`
//! - `MOEX_VIEWER_ON_ERROR` - `abort_batch` or `skip_document`
//! - `MOEX_VIEWER_COLUMNS` - comma separated display columns

use crate::error::{AppError, Result};
use crate::xml::QuoteEscape;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_LOG: &str = "MOEX_VIEWER_LOG";
pub const ENV_QUOTE_ESCAPE: &str = "MOEX_VIEWER_QUOTE_ESCAPE";
pub const ENV_ON_ERROR: &str = "MOEX_VIEWER_ON_ERROR";
pub const ENV_COLUMNS: &str = "MOEX_VIEWER_COLUMNS";

/// Columns shown in the history table when none are requested
pub const DEFAULT_DISPLAY_COLUMNS: [&str; 8] = [
    "secid",
    "regnumber",
    "name",
    "emitent_title",
    "tradedate",
    "numtrades",
    "open",
    "close",
];

/// What a failing document does to the rest of its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchErrorPolicy {
    /// Reject the whole batch; nothing is merged
    #[default]
    AbortBatch,
    /// Report the document and merge the others
    SkipDocument,
}

impl BatchErrorPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort_batch" | "abort" => Some(BatchErrorPolicy::AbortBatch),
            "skip_document" | "skip" => Some(BatchErrorPolicy::SkipDocument),
            _ => None,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub display_columns: Vec<String>,
    pub quote_escape: QuoteEscape,
    pub on_error: BatchErrorPolicy,
    pub log_filter: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display_columns: DEFAULT_DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            quote_escape: QuoteEscape::default(),
            on_error: BatchErrorPolicy::default(),
            log_filter: "moex_viewer=info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let config: ViewerConfig = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("Invalid config file {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }

        if let Some(value) = lookup(ENV_QUOTE_ESCAPE) {
            self.quote_escape = QuoteEscape::parse(&value).ok_or_else(|| {
                AppError::Config(format!(
                    "{} must be 'standard' or 'legacy', got {:?}",
                    ENV_QUOTE_ESCAPE, value
                ))
            })?;
        }

        if let Some(value) = lookup(ENV_ON_ERROR) {
            self.on_error = BatchErrorPolicy::parse(&value).ok_or_else(|| {
                AppError::Config(format!(
                    "{} must be 'abort_batch' or 'skip_document', got {:?}",
                    ENV_ON_ERROR, value
                ))
            })?;
        }

        if let Some(value) = lookup(ENV_COLUMNS) {
            self.display_columns = value
                .split(',')
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect();
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.display_columns.is_empty() {
            return Err(AppError::Config("display_columns must not be empty".to_string()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(AppError::Config("log_filter must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.display_columns.len(), 8);
        assert_eq!(config.display_columns[0], "secid");
        assert_eq!(config.quote_escape, QuoteEscape::Standard);
        assert_eq!(config.on_error, BatchErrorPolicy::AbortBatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = ViewerConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_QUOTE_ESCAPE, "legacy"),
                (ENV_ON_ERROR, "skip_document"),
                (ENV_COLUMNS, "SECID, name ,,close"),
                (ENV_LOG, "moex_viewer=debug"),
            ]))
            .unwrap();

        assert_eq!(config.quote_escape, QuoteEscape::Legacy);
        assert_eq!(config.on_error, BatchErrorPolicy::SkipDocument);
        assert_eq!(config.display_columns, vec!["secid", "name", "close"]);
        assert_eq!(config.log_filter, "moex_viewer=debug");
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = ViewerConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_ON_ERROR, "retry")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let mut config = ViewerConfig::default();
        assert!(config.apply_overrides(lookup(&[(ENV_COLUMNS, " , ")])).is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{"quote_escape": "legacy", "display_columns": ["secid", "open"]}"#;
        file.write_all(json.as_bytes()).unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.quote_escape, QuoteEscape::Legacy);
        assert_eq!(config.display_columns, vec!["secid", "open"]);
        assert_eq!(config.on_error, BatchErrorPolicy::AbortBatch);
    }

    #[test]
    fn test_load_missing_and_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ViewerConfig::default());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ViewerConfig::load(&path), Err(AppError::Config(_))));
    }
}
