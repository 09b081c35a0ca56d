use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{FrontmatterBlock, FrontmatterEntry, FrontmatterValue};

const OPEN: &str = "---\n";
const CLOSE: &str = "\n---";

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("invalid date prefix regex"));

/// Split a document into its raw frontmatter text and body.
///
/// Returns `None` for the frontmatter when the document has no well-formed
/// block; the body is then the whole input.
pub fn split(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix(OPEN) else {
        return (None, raw);
    };
    let Some(close) = rest.find(CLOSE) else {
        debug!("frontmatter opened without a closing delimiter, reading as body");
        return (None, raw);
    };
    let fm = &rest[..close];
    let after = &rest[close + CLOSE.len()..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    (Some(fm), body)
}

/// True when the document starts with a well-formed frontmatter block.
pub fn has_frontmatter(raw: &str) -> bool {
    raw.strip_prefix(OPEN)
        .is_some_and(|rest| rest.contains(CLOSE))
}

/// Parse the metadata block and return it with the body.
pub fn parse(raw: &str) -> (FrontmatterBlock, &str) {
    let (Some(fm), body) = split(raw) else {
        return (FrontmatterBlock::default(), raw);
    };
    let entries = fm
        .split('\n')
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let raw = value.trim().to_string();
            Some(FrontmatterEntry {
                key: key.trim().to_string(),
                value: coerce(&unquote(&raw)),
                raw,
            })
        })
        .collect();
    (FrontmatterBlock::from_entries(entries), body)
}

/// Strip one pair of matching quotes. Double-quoted values also get `\"`
/// and `\\` unescaped.
fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return unescape(inner);
        }
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    value.to_string()
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn coerce(value: &str) -> FrontmatterValue {
    if value.eq_ignore_ascii_case("true") {
        return FrontmatterValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return FrontmatterValue::Bool(false);
    }
    if DATE_PREFIX.is_match(value) {
        return parse_date(value).map_or_else(
            || FrontmatterValue::Text(value.to_string()),
            FrontmatterValue::Date,
        );
    }
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .collect();
        return FrontmatterValue::List(items);
    }
    FrontmatterValue::Text(value.to_string())
}

/// Parse an ISO-like date. Date-times without an offset and bare dates are
/// read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
