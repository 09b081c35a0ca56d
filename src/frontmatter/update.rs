use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::parse::parse_date;
use super::to_iso;

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*:").expect("invalid key line regex"));

/// New value for a frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    Date(DateTime<Utc>),
}

impl ChangeValue {
    fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bool(value) => value.to_string(),
            Self::List(items) => items.join(","),
            Self::Date(date) => to_iso(date),
        }
    }

    fn as_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Bool(_) | Self::Date(_) => Vec::new(),
        }
    }

    fn as_flag(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => text.trim().eq_ignore_ascii_case("true"),
            Self::List(items) => !items.is_empty(),
            Self::Date(_) => true,
        }
    }

    fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Text(text) => parse_date(text),
            Self::Bool(_) | Self::List(_) => None,
        }
    }
}

impl From<&str> for ChangeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ChangeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ChangeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ChangeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<DateTime<Utc>> for ChangeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Ordered set of key changes. Setting a key twice keeps its first
/// position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterChanges {
    entries: Vec<(String, ChangeValue)>,
}

impl FrontmatterChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ChangeValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ChangeValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ChangeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChangeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Double-quote a value, escaping backslashes and quotes.
pub fn yaml_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn render_line(key: &str, value: &ChangeValue) -> String {
    match key {
        "tags" => {
            let items: Vec<String> = value.as_list().iter().map(|t| yaml_quote(t)).collect();
            format!("{key}: [{}]", items.join(", "))
        }
        "draft" => format!("{key}: {}", value.as_flag()),
        "pubDate" | "updatedDate" => {
            let date = value.as_date().map(|d| to_iso(&d)).unwrap_or_default();
            format!("{key}: {date}")
        }
        _ => format!("{key}: {}", yaml_quote(&value.as_text())),
    }
}

/// Rewrite the lines of `fm_text` whose key appears in `changes` and append
/// the keys that were not present, in change order.
///
/// Lines not touched keep their exact bytes, including a trailing `\r`.
pub fn update(fm_text: &str, changes: &FrontmatterChanges) -> String {
    if changes.is_empty() {
        return fm_text.to_string();
    }
    let mut applied: Vec<&str> = Vec::new();
    let mut lines: Vec<String> = fm_text
        .split('\n')
        .map(|line| {
            let Some(key) = KEY_LINE.captures(line).and_then(|c| c.get(1)) else {
                return line.to_string();
            };
            let key = key.as_str();
            match changes.get(key) {
                Some(value) => {
                    if !applied.contains(&key) {
                        applied.push(key);
                    }
                    render_line(key, value)
                }
                None => line.to_string(),
            }
        })
        .collect();

    for (key, value) in changes.iter() {
        if !applied.contains(&key) {
            lines.push(render_line(key, value));
        }
    }
    lines.join("\n")
}
