//! Frontmatter codec.
//!
//! A document may start with a metadata block:
//!
//! ```text
//! ---
//! title: "Hello"
//! draft: false
//! tags: ["a", "b"]
//! ---
//!
//! Body text.
//! ```
//!
//! Parsing is lenient: a malformed block reads as "no metadata". Updates
//! rewrite only the named keys and leave every other line byte-for-byte
//! intact.

mod parse;
mod update;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use parse::{has_frontmatter, parse, parse_date, split};
pub use update::{ChangeValue, FrontmatterChanges, update, yaml_quote};

/// Typed value of a frontmatter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Text(String),
    Bool(bool),
    #[serde(serialize_with = "serialize_iso")]
    Date(DateTime<Utc>),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub const fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Canonical ISO form used for every date the codec writes.
pub fn to_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso(date))
}

/// One `key: value` line of the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterEntry {
    pub key: String,
    /// Value text after the first `:`, trimmed but not unquoted.
    pub raw: String,
    pub value: FrontmatterValue,
}

/// Parsed metadata block, entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterBlock {
    entries: Vec<FrontmatterEntry>,
}

impl FrontmatterBlock {
    pub(crate) const fn from_entries(entries: Vec<FrontmatterEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[FrontmatterEntry] {
        &self.entries
    }

    /// Value for `key`. A key repeated in the block resolves to its last
    /// occurrence.
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FrontmatterValue::as_bool)
    }
}

impl Serialize for FrontmatterBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.key.as_str()) {
                seen.push(&entry.key);
            }
        }
        let mut map = serializer.serialize_map(Some(seen.len()))?;
        for key in seen {
            if let Some(value) = self.get(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
