//! Export Service
//!
//! Renders stored rows back as `<row .../>` elements.

use crate::db::Database;
use crate::xml::QuoteEscape;

pub struct ExportService;

impl ExportService {
    /// One element per history entry, in current order
    pub fn history_rows(db: &Database, escape: QuoteEscape) -> Vec<String> {
        db.list_history_entries()
            .iter()
            .map(|entry| entry.to_xml_row(escape))
            .collect()
    }

    /// One element per security, ordered by secid
    pub fn security_rows(db: &Database, escape: QuoteEscape) -> Vec<String> {
        db.securities()
            .into_iter()
            .map(|security| security.to_xml_row(escape))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Security;
    use crate::xml::{AttrValue, Attributes};

    #[test]
    fn test_export_rows() {
        let mut db = Database::new();
        for (secid, name) in [("SBER", "\"Sber\""), ("AFLT", "Aeroflot")] {
            let mut info = Attributes::new();
            info.insert("secid".to_string(), AttrValue::from(secid));
            info.insert("name".to_string(), AttrValue::from(name));
            db.register_security(Security::new(secid, info).unwrap());
        }
        let mut row = Attributes::new();
        row.insert("secid".to_string(), AttrValue::from("SBER"));
        row.insert("open".to_string(), AttrValue::Float(250.5));
        let entry = db.create_history_entry("SBER", row).unwrap();
        db.register_history_entry(entry);

        assert_eq!(
            ExportService::security_rows(&db, QuoteEscape::Legacy),
            vec![
                "<row secid=\"AFLT\" name=\"Aeroflot\" />".to_string(),
                "<row secid=\"SBER\" name=\"&quotSber&quot\" />".to_string(),
            ]
        );
        assert_eq!(
            ExportService::history_rows(&db, QuoteEscape::Standard),
            vec!["<row secid=\"SBER\" open=\"250.5\" />".to_string()]
        );
    }
}
