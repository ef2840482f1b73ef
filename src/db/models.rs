//! In-memory data models

use crate::error::{AppError, Result};
use crate::xml::{write_row, AttrValue, Attributes, QuoteEscape, Record, SECID};
use indexmap::IndexMap;
use serde::Serialize;

/// One display row: attribute name -> value, in column order
pub type JoinedRow = IndexMap<String, AttrValue>;

/// Reference data for one tradable instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Security {
    secid: String,
    attributes: Attributes,
}

impl Security {
    /// Create a security. The `secid` must be non-empty.
    pub fn new(secid: impl Into<String>, attributes: Attributes) -> Result<Self> {
        let secid = secid.into();
        if secid.is_empty() {
            return Err(AppError::Validation("security secid must not be empty".to_string()));
        }
        Ok(Self { secid, attributes })
    }

    /// Build a security from a decoded securities row
    pub fn from_record(record: Record) -> Result<Self> {
        let secid = record.secid().ok_or_else(|| {
            AppError::Validation(format!(
                "securities row without secid ({} attributes)",
                record.len()
            ))
        })?;
        Self::new(secid, record.into_attributes())
    }

    pub fn secid(&self) -> &str {
        &self.secid
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name.to_lowercase().as_str())
    }

    /// Add or replace attributes. The `secid` itself never changes.
    pub fn merge_attributes(&mut self, attributes: Attributes) {
        for (name, value) in attributes {
            let name = name.to_lowercase();
            if name == SECID {
                continue;
            }
            self.attributes.insert(name, value);
        }
    }

    pub fn to_xml_row(&self, escape: QuoteEscape) -> String {
        write_row(&self.attributes, escape)
    }
}

/// One trading-history row. The owning security is looked up by `secid`
/// through the [`Database`](super::Database); entries are only created by it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    id: u64,
    secid: String,
    attributes: Attributes,
}

impl HistoryEntry {
    pub(crate) fn new(id: u64, secid: String, attributes: Attributes) -> Self {
        Self {
            id,
            secid,
            attributes,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn secid(&self) -> &str {
        &self.secid
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name.to_lowercase().as_str())
    }

    pub fn to_xml_row(&self, escape: QuoteEscape) -> String {
        write_row(&self.attributes, escape)
    }
}

/// Collection sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub securities: usize,
    pub history_entries: usize,
}
