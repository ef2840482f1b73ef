//! History Service
//!
//! Joined history rows for the table view.

use crate::db::{Database, DatabaseStats, JoinedRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One table column: header shown to the user and the attribute it reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub header: String,
    pub key: String,
}

/// History service for business logic
pub struct HistoryService;

impl HistoryService {
    /// One projected row per history entry, in current sort order
    pub fn joined_rows<S: AsRef<str>>(db: &Database, columns: &[S]) -> Vec<JoinedRow> {
        let rows = db.list_joined_rows(columns);
        debug!("HistoryService::joined_rows - {} rows x {} columns", rows.len(), columns.len());
        rows
    }

    /// Every attribute of every entry merged with its security
    pub fn full_rows(db: &Database) -> Vec<JoinedRow> {
        db.list_history_entries()
            .iter()
            .map(|entry| db.joined_row(entry))
            .collect()
    }

    /// Upper-case headers over lower-case attribute keys
    pub fn table_columns<S: AsRef<str>>(columns: &[S]) -> Vec<TableColumn> {
        let mut seen = Vec::with_capacity(columns.len());
        for column in columns {
            let key = column.as_ref().trim().to_lowercase();
            if key.is_empty() || seen.iter().any(|c: &TableColumn| c.key == key) {
                continue;
            }
            seen.push(TableColumn {
                header: key.to_uppercase(),
                key,
            });
        }
        seen
    }

    pub fn stats(db: &Database) -> DatabaseStats {
        db.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Security;
    use crate::xml::{AttrValue, Attributes};

    fn seeded() -> Database {
        let mut db = Database::new();
        let mut info = Attributes::new();
        info.insert("secid".to_string(), AttrValue::from("ABC"));
        info.insert("name".to_string(), AttrValue::from("AcmeCo"));
        db.register_security(Security::new("ABC", info).unwrap());

        let mut row = Attributes::new();
        row.insert("secid".to_string(), AttrValue::from("ABC"));
        row.insert("numtrades".to_string(), AttrValue::Integer(3));
        let entry = db.create_history_entry("ABC", row).unwrap();
        db.register_history_entry(entry);
        db
    }

    #[test]
    fn test_joined_rows() {
        let db = seeded();
        let rows = HistoryService::joined_rows(&db, &["secid", "name", "numtrades", "close"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0]["name"], AttrValue::from("AcmeCo"));
    }

    #[test]
    fn test_full_rows() {
        let db = seeded();
        let rows = HistoryService::full_rows(&db);
        let keys: Vec<&str> = rows[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["secid", "name", "numtrades"]);
    }

    #[test]
    fn test_table_columns() {
        let columns = HistoryService::table_columns(&["secid", "Emitent_Title", "SECID", " "]);
        assert_eq!(
            columns,
            vec![
                TableColumn {
                    header: "SECID".to_string(),
                    key: "secid".to_string()
                },
                TableColumn {
                    header: "EMITENT_TITLE".to_string(),
                    key: "emitent_title".to_string()
                },
            ]
        );
    }
}
