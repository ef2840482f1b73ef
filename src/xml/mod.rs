//! MOEX ISS XML handling
//!
//! - `value` - typed attribute values and declared column types
//! - `record` - one decoded `<row>`
//! - `reader` - streaming document parser
//! - `writer` - `<row .../>` serialization

pub mod value;
pub mod record;
pub mod reader;
pub mod writer;

pub use reader::{
    is_pagination_column, DataKind, ParsedDocument, RecordParser, TypeTable, PAGINATION_COLUMNS,
};
pub use record::{Attributes, Record, SECID};
pub use value::{AttrValue, ColumnType};
pub use writer::{write_row, QuoteEscape};
