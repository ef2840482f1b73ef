//! One decoded `<row>` element

use super::value::AttrValue;
use indexmap::IndexMap;
use std::fmt;

/// Ordered attribute map keyed by lowercase attribute name
pub type Attributes = IndexMap<String, AttrValue>;

/// Name of the join key shared by securities and history rows
pub const SECID: &str = "secid";

/// Decoded row, attribute order as in the source element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Attributes,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, lowercasing its name
    pub fn insert(&mut self, name: &str, value: AttrValue) -> Option<AttrValue> {
        self.attributes.insert(name.to_lowercase(), value)
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name.to_lowercase().as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.attributes.iter()
    }

    /// The row's `secid`, if present and non-empty
    pub fn secid(&self) -> Option<String> {
        self.get(SECID)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Self { attributes }
    }
}

impl FromIterator<(String, AttrValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(&name, value);
        }
        record
    }
}

/// One `name<TAB>value` line per non-empty attribute
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for (name, value) in self.attributes.iter().filter(|(_, v)| !v.is_empty()) {
            writeln!(f, "{}\t{}", name, value)?;
        }
        Ok(())
    }
}
