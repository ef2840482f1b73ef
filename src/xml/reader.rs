//! Streaming reader for MOEX ISS XML exports
//!
//! A document looks like:
//!
//! ```text
//! <document>
//!   <data id="history">
//!     <metadata><columns>
//!       <column name="SECID" type="string" />
//!       <column name="NUMTRADES" type="int32" />
//!     </columns></metadata>
//!     <rows>
//!       <row SECID="SBER" NUMTRADES="10" />
//!     </rows>
//!   </data>
//!   <data id="history.cursor"> ... <row INDEX="0" TOTAL="100" PAGESIZE="100" /> ...
//! </document>
//! ```
//!
//! The whole document is read in one forward pass. The first `<data>` element
//! decides the data kind, `<column>` declarations fill the type table, and
//! every business `<row>` becomes a [`Record`].

use super::record::Record;
use super::value::ColumnType;
use crate::error::{AppError, Result};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Pagination metadata, never business data
pub const PAGINATION_COLUMNS: [&str; 3] = ["index", "total", "pagesize"];

/// Whether a column or attribute name is pagination metadata
pub fn is_pagination_column(name: &str) -> bool {
    let name = name.trim();
    PAGINATION_COLUMNS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Declared data kind of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Securities,
    History,
}

impl DataKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "securities" => Some(DataKind::Securities),
            "history" => Some(DataKind::History),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Securities => "securities",
            DataKind::History => "history",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column name -> declared type, in declaration order
pub type TypeTable = IndexMap<String, ColumnType>;

/// Result of parsing one document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub source: String,
    pub kind: DataKind,
    pub columns: TypeTable,
    pub records: Vec<Record>,
}

/// Single-document parser. The source name is carried per instance and only
/// used for error messages.
#[derive(Debug)]
pub struct RecordParser {
    source: String,
    kind: Option<DataKind>,
    types: TypeTable,
    records: Vec<Record>,
    skipped_rows: usize,
}

impl RecordParser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: None,
            types: TypeTable::new(),
            records: Vec::new(),
            skipped_rows: 0,
        }
    }

    /// Open and parse a file. The file handle is dropped on return.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedDocument> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
            _ => AppError::Io(e),
        })?;

        RecordParser::new(path.display().to_string()).parse(BufReader::new(file))
    }

    /// Parse in-memory text
    pub fn parse_str(source: impl Into<String>, text: &str) -> Result<ParsedDocument> {
        RecordParser::new(source).parse(text.as_bytes())
    }

    /// Parse a buffered reader to the end
    pub fn parse<R: BufRead>(mut self, input: R) -> Result<ParsedDocument> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut saw_element = false;

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| self.malformed(reader.buffer_position(), e))?;

            match event {
                Event::Start(ref element) => {
                    if depth == 0 && saw_element {
                        return Err(self.malformed(position, "more than one root element"));
                    }
                    depth += 1;
                    saw_element = true;
                    self.handle_element(element, position)?;
                }
                Event::Empty(ref element) => {
                    if depth == 0 && saw_element {
                        return Err(self.malformed(position, "more than one root element"));
                    }
                    saw_element = true;
                    self.handle_element(element, position)?;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_element {
            return Err(self.malformed(0, "document has no root element"));
        }
        if depth > 0 {
            return Err(self.malformed(
                reader.buffer_position(),
                format!("unexpected end of document with {} unclosed element(s)", depth),
            ));
        }

        let kind = self
            .kind
            .ok_or_else(|| self.malformed(0, "document does not declare a data kind"))?;

        tracing::debug!(
            "Parsed {} {} records from {} ({} columns declared, {} rows skipped)",
            self.records.len(),
            kind,
            self.source,
            self.types.len(),
            self.skipped_rows
        );

        Ok(ParsedDocument {
            source: self.source,
            kind,
            columns: self.types,
            records: self.records,
        })
    }

    fn handle_element(&mut self, element: &BytesStart, position: usize) -> Result<()> {
        match element.local_name().as_ref() {
            b"data" if self.kind.is_none() => {
                let attributes = self.read_attributes(element, position)?;
                self.read_data_kind(&attributes)
            }
            b"column" => {
                let attributes = self.read_attributes(element, position)?;
                self.read_column(&attributes);
                Ok(())
            }
            b"row" => {
                let attributes = self.read_attributes(element, position)?;
                self.read_row(attributes, position)
            }
            _ => Ok(()),
        }
    }

    fn read_attributes(
        &self,
        element: &BytesStart,
        position: usize,
    ) -> Result<Vec<(String, String)>> {
        element
            .attributes()
            .map(|attr| {
                let attr = attr.map_err(|e| self.malformed(position, e))?;
                let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map_err(|e| self.malformed(position, e))?
                    .into_owned();
                Ok((name, value))
            })
            .collect()
    }

    fn read_data_kind(&mut self, attributes: &[(String, String)]) -> Result<()> {
        let declared = attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("id"))
            .or_else(|| attributes.first())
            .map(|(_, value)| value.as_str())
            .unwrap_or_default();

        match DataKind::parse(declared) {
            Some(kind) => {
                self.kind = Some(kind);
                Ok(())
            }
            None => Err(AppError::UnrecognizedDataKind {
                source_name: self.source.clone(),
                kind: declared.to_string(),
            }),
        }
    }

    fn read_column(&mut self, attributes: &[(String, String)]) {
        let mut name = String::new();
        let mut tag = "";
        for (attr, value) in attributes {
            if attr.eq_ignore_ascii_case("name") {
                name = value.trim().to_lowercase();
            } else if attr.eq_ignore_ascii_case("type") {
                tag = value;
            }
        }

        if name.is_empty() || is_pagination_column(&name) {
            return;
        }
        self.types.insert(name, ColumnType::from_tag(tag));
    }

    fn read_row(&mut self, attributes: Vec<(String, String)>, position: usize) -> Result<()> {
        match attributes.first() {
            None => {
                self.skipped_rows += 1;
                return Ok(());
            }
            Some((first, _)) if is_pagination_column(first) => {
                self.skipped_rows += 1;
                return Ok(());
            }
            Some(_) => {}
        }

        let mut record = Record::new();
        for (name, raw) in attributes {
            let name = name.to_lowercase();
            if is_pagination_column(&name) {
                continue;
            }
            if record.contains(&name) {
                return Err(self.malformed(
                    position,
                    format!("attribute {:?} repeated with different case", name),
                ));
            }

            let column_type = self.types.get(&name).copied().unwrap_or_default();
            let value = column_type
                .coerce(&raw)
                .map_err(|expected| AppError::TypeCoercion {
                    source_name: self.source.clone(),
                    column: name.clone(),
                    value: raw.clone(),
                    expected,
                })?;
            record.insert(&name, value);
        }

        self.records.push(record);
        Ok(())
    }

    fn malformed(&self, position: usize, message: impl fmt::Display) -> AppError {
        AppError::MalformedInput(format!("{} at byte {}: {}", self.source, position, message))
    }
}
