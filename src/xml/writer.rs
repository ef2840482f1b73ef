//! Row serialization: attribute map -> `<row k="v" ... />`

use super::record::Attributes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How attribute values are escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteEscape {
    /// Full XML attribute escaping
    #[default]
    Standard,
    /// Only `"` is replaced, by `&quot` without the semicolon. Matches the
    /// output of earlier exports byte for byte.
    Legacy,
}

impl QuoteEscape {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(QuoteEscape::Standard),
            "legacy" => Some(QuoteEscape::Legacy),
            _ => None,
        }
    }

    pub fn escape<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            QuoteEscape::Standard => quick_xml::escape::escape(value),
            QuoteEscape::Legacy if value.contains('"') => Cow::Owned(value.replace('"', "&quot")),
            QuoteEscape::Legacy => Cow::Borrowed(value),
        }
    }
}

/// Render one self-closing row element
pub fn write_row(attributes: &Attributes, escape: QuoteEscape) -> String {
    let mut row = String::from("<row ");
    for (name, value) in attributes {
        let text = value.to_string();
        row.push_str(name);
        row.push_str("=\"");
        row.push_str(&escape.escape(&text));
        row.push_str("\" ");
    }
    row.push_str("/>");
    row
}
