//! In-memory securities / trading-history database
//!
//! Securities are keyed by `secid`. History entries may only exist for a
//! known `secid` and are kept sorted by `secid` (stable, so entries of one
//! security keep their arrival order). Entry ids come from one process-wide
//! sequence, so ids stay unique across databases.

pub mod models;

use crate::xml::{Attributes, AttrValue};
pub use models::{DatabaseStats, HistoryEntry, JoinedRow, Security};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HISTORY_ID: AtomicU64 = AtomicU64::new(0);

/// Securities and history entries of the current session
#[derive(Debug, Default)]
pub struct Database {
    securities: HashMap<String, Security>,
    histories: Vec<HistoryEntry>,
    history_ids: HashSet<u64>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Security Methods ==========

    /// Insert or replace a security, returning the replaced one
    pub fn register_security(&mut self, security: Security) -> Option<Security> {
        self.securities.insert(security.secid().to_string(), security)
    }

    /// Insert or replace many securities
    pub fn register_securities<I>(&mut self, securities: I) -> usize
    where
        I: IntoIterator<Item = Security>,
    {
        let mut count = 0;
        for security in securities {
            self.register_security(security);
            count += 1;
        }
        count
    }

    pub fn security(&self, secid: &str) -> Option<&Security> {
        self.securities.get(secid)
    }

    pub fn has_security(&self, secid: &str) -> bool {
        self.securities.contains_key(secid)
    }

    /// All securities ordered by `secid`
    pub fn securities(&self) -> Vec<&Security> {
        let mut securities: Vec<&Security> = self.securities.values().collect();
        securities.sort_by(|a, b| a.secid().cmp(b.secid()));
        securities
    }

    pub fn security_count(&self) -> usize {
        self.securities.len()
    }

    // ========== History Methods ==========

    /// Build an entry with the next sequence id, only if its security exists.
    /// The entry is not stored until registered.
    pub fn create_history_entry(
        &self,
        secid: &str,
        attributes: Attributes,
    ) -> Option<HistoryEntry> {
        if !self.has_security(secid) {
            return None;
        }
        let id = NEXT_HISTORY_ID.fetch_add(1, Ordering::Relaxed);
        Some(HistoryEntry::new(id, secid.to_string(), attributes))
    }

    /// Store one entry. Entries whose security is unknown, or whose id is
    /// already stored, are dropped.
    pub fn register_history_entry(&mut self, entry: HistoryEntry) -> bool {
        let accepted = self.append_history(entry);
        if accepted {
            self.sort_histories();
        }
        accepted
    }

    /// Store many entries, returning how many were accepted
    pub fn register_history_entries<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        let mut accepted = 0;
        for entry in entries {
            if self.append_history(entry) {
                accepted += 1;
            }
        }
        self.sort_histories();
        accepted
    }

    /// Append without re-sorting; batch callers sort once at the end
    pub(crate) fn append_history(&mut self, entry: HistoryEntry) -> bool {
        if !self.has_security(entry.secid()) {
            tracing::debug!(
                "Dropping history entry {} for unknown secid {}",
                entry.id(),
                entry.secid()
            );
            return false;
        }
        if !self.history_ids.insert(entry.id()) {
            tracing::debug!("Dropping duplicate history entry {}", entry.id());
            return false;
        }
        self.histories.push(entry);
        true
    }

    pub(crate) fn sort_histories(&mut self) {
        self.histories.sort_by(|a, b| a.secid().cmp(b.secid()));
    }

    /// All entries in current order
    pub fn list_history_entries(&self) -> &[HistoryEntry] {
        &self.histories
    }

    /// Entries of one security, in current order
    pub fn history_for<'a>(
        &'a self,
        secid: &'a str,
    ) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.histories.iter().filter(move |entry| entry.secid() == secid)
    }

    pub fn history_count(&self) -> usize {
        self.histories.len()
    }

    /// The security an entry belongs to
    pub fn security_for(&self, entry: &HistoryEntry) -> Option<&Security> {
        self.security(entry.secid())
    }

    // ========== Join Methods ==========

    /// Values for the requested names: the entry's own value wins, then the
    /// security's; names found in neither are left out.
    pub fn project_history_entry<S: AsRef<str>>(
        &self,
        entry: &HistoryEntry,
        names: &[S],
    ) -> JoinedRow {
        let security = self.security_for(entry);
        let mut row = JoinedRow::new();

        for name in names {
            let name = name.as_ref().to_lowercase();
            let value = entry
                .get(&name)
                .or_else(|| security.and_then(|s| s.get(&name)));
            if let Some(value) = value {
                row.insert(name, value.clone());
            }
        }
        row
    }

    /// Every security attribute followed by every entry attribute, entry
    /// values overriding
    pub fn joined_row(&self, entry: &HistoryEntry) -> JoinedRow {
        let mut row: JoinedRow = self
            .security_for(entry)
            .map(|s| s.attributes().clone())
            .unwrap_or_default();
        for (name, value) in entry.attributes() {
            row.insert(name.clone(), value.clone());
        }
        row
    }

    /// Projection of every entry, in current order
    pub fn list_joined_rows<S: AsRef<str>>(&self, names: &[S]) -> Vec<JoinedRow> {
        self.histories
            .iter()
            .map(|entry| self.project_history_entry(entry, names))
            .collect()
    }

    /// Look up a single value of an entry with the same precedence as projection
    pub fn joined_value<'a>(
        &'a self,
        entry: &'a HistoryEntry,
        name: &str,
    ) -> Option<&'a AttrValue> {
        entry
            .get(name)
            .or_else(|| self.security_for(entry).and_then(|s| s.get(name)))
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            securities: self.securities.len(),
            history_entries: self.histories.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty() && self.histories.is_empty()
    }
}
