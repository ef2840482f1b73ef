//! Typed attribute values and declared column types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Fixed textual format of `date` columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column type declared by a `<column>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int32,
    Date,
    Double,
    #[default]
    Text,
}

impl ColumnType {
    /// Map a declaration's `type` tag. Tags other than int32/date/double
    /// (string, int64, time, datetime, ...) stay textual.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "int32" => ColumnType::Int32,
            "date" => ColumnType::Date,
            "double" => ColumnType::Double,
            _ => ColumnType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int32 => "int32",
            ColumnType::Date => "date",
            ColumnType::Double => "double",
            ColumnType::Text => "string",
        }
    }

    /// Coerce raw attribute text. Empty text is never coerced.
    ///
    /// On failure the declared type is returned so the caller can build a
    /// coercion error with document context.
    pub fn coerce(&self, raw: &str) -> std::result::Result<AttrValue, ColumnType> {
        if raw.is_empty() {
            return Ok(AttrValue::Text(String::new()));
        }

        match self {
            ColumnType::Int32 => raw.parse::<i32>().map(AttrValue::Integer).map_err(|_| *self),
            ColumnType::Date if !is_date_shape(raw) => Err(*self),
            ColumnType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(AttrValue::Date)
                .map_err(|_| *self),
            ColumnType::Double => raw.parse::<f64>().map(AttrValue::Float).map_err(|_| *self),
            ColumnType::Text => Ok(AttrValue::Text(raw.to_string())),
        }
    }
}

/// Zero-padded `YYYY-MM-DD`; chrono alone also accepts `2020-1-5`
fn is_date_shape(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value after type coercion
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Integer(i32),
    Float(f64),
    Date(NaiveDate),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AttrValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// True for the empty string, which is how blank cells arrive
    pub fn is_empty(&self) -> bool {
        matches!(self, AttrValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Integer(i) => write!(f, "{}", i),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<NaiveDate> for AttrValue {
    fn from(d: NaiveDate) -> Self {
        AttrValue::Date(d)
    }
}

// Table cells: strings and dates as JSON strings, numbers as numbers
impl Serialize for AttrValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AttrValue::Text(s) => serializer.serialize_str(s),
            AttrValue::Integer(i) => serializer.serialize_i32(*i),
            AttrValue::Float(f) => serializer.serialize_f64(*f),
            AttrValue::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
        }
    }
}
