//! External-interface types and the helpers that derive post metadata.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::frontmatter::{ChangeValue, FrontmatterBlock, FrontmatterChanges, FrontmatterValue, to_iso};

const TITLE_LIMIT: usize = 300;
const SLUG_LIMIT: usize = 200;
pub const DEFAULT_EXCERPT_LIMIT: usize = 140;

static FENCED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("invalid fence regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").expect("invalid code regex"));
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#>*_\-]+").expect("invalid markup regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid slug regex"));

/// Body of a save call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Desired location; a different basename renames the post.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    /// ISO date-time.
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub content_markdown: String,
}

/// Metadata re-derived from the persisted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub cover_url: String,
    pub pub_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub updated: bool,
    pub renamed: bool,
    pub filename: String,
    pub path: String,
    pub meta: PostMeta,
}

/// The editable fields around the document body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub filename: String,
    pub content_dir: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    /// Local `YYYY-MM-DDTHH:MM` value, empty when unset.
    pub pub_date: String,
    pub draft: bool,
    /// Comma or newline separated.
    pub tags_input: String,
}

/// Frontmatter changes for a save request, in write order.
pub fn build_changes(request: &SaveRequest, now: DateTime<Utc>) -> FrontmatterChanges {
    let mut changes = FrontmatterChanges::new();
    if let Some(title) = &request.title {
        changes.set("title", title.trim().chars().take(TITLE_LIMIT).collect::<String>());
    }
    if let Some(description) = &request.description {
        changes.set("description", description.trim());
    }
    changes.set(
        "coverUrl",
        request.cover_url.as_deref().map(str::trim).unwrap_or_default(),
    );
    if let Some(pub_date) = &request.pub_date {
        changes.set("pubDate", pub_date.as_str());
        changes.set("updatedDate", now);
    }
    if let Some(draft) = request.draft {
        changes.set("draft", draft);
    }
    if let Some(tags) = &request.tags {
        changes.set("tags", normalize_list(tags));
    }
    changes
}

/// Metadata of the saved text, falling back to the requested values where
/// the frontmatter has nothing usable.
pub fn latest_meta(block: &FrontmatterBlock, changes: &FrontmatterChanges) -> PostMeta {
    let requested = |key: &str| match changes.get(key) {
        Some(ChangeValue::Text(text)) => Some(text.clone()),
        Some(ChangeValue::Date(date)) => Some(to_iso(date)),
        _ => None,
    };
    let stored = |key: &str| match block.get(key) {
        Some(FrontmatterValue::Text(text)) => Some(text.clone()),
        Some(FrontmatterValue::Date(date)) => Some(to_iso(date)),
        _ => None,
    };
    PostMeta {
        title: block
            .get_str("title")
            .map(|t| t.trim().to_string())
            .or_else(|| requested("title"))
            .unwrap_or_default(),
        description: block
            .get_str("description")
            .map(str::to_string)
            .or_else(|| requested("description"))
            .unwrap_or_default(),
        tags: normalize_tags(block.get("tags")),
        draft: block.get_bool("draft") == Some(true),
        cover_url: block
            .get_str("coverUrl")
            .map(str::to_string)
            .or_else(|| requested("coverUrl"))
            .unwrap_or_default(),
        pub_date: stored("pubDate").or_else(|| requested("pubDate")),
        updated_date: stored("updatedDate").or_else(|| requested("updatedDate")),
    }
}

/// Tags from a frontmatter value: a list, or a comma separated string.
pub fn normalize_tags(value: Option<&FrontmatterValue>) -> Vec<String> {
    match value {
        Some(FrontmatterValue::List(items)) => normalize_list(items),
        Some(FrontmatterValue::Text(text)) => normalize_list(text.split(',')),
        _ => Vec::new(),
    }
}

fn normalize_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Tags typed into the form, split on commas and newlines.
pub fn collect_tags(input: &str) -> Vec<String> {
    normalize_list(input.split([',', '\n']))
}

/// Lowercase, runs of anything but `a-z0-9` become `-`, trimmed of dashes.
pub fn slugify(value: &str) -> String {
    let lower = value.to_lowercase();
    let dashed = NON_SLUG.replace_all(&lower, "-");
    dashed.trim_matches('-').chars().take(SLUG_LIMIT).collect()
}

/// Plain-text teaser of a markdown body.
pub fn make_excerpt(body: &str, limit: usize) -> String {
    let text = FENCED.replace_all(body, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = MARKUP.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().chars().take(limit).collect()
}

/// Relative path of a post: `dir/slug.md`, or `untitled.md` for an empty slug.
pub fn post_path(content_dir: &str, slug: &str) -> String {
    let slug = slug.trim();
    let name = if slug.is_empty() {
        "untitled.md".to_string()
    } else {
        format!("{slug}.md")
    };
    join_dir(content_dir, &name)
}

pub(crate) fn join_dir(content_dir: &str, filename: &str) -> String {
    let dir = content_dir.trim().trim_end_matches('/');
    if dir.is_empty() {
        filename.to_string()
    } else {
        format!("{dir}/{filename}")
    }
}

/// Strip a trailing `.md`, any case.
pub fn strip_md(filename: &str) -> &str {
    let len = filename.len();
    if len >= 3 && filename.is_char_boundary(len - 3) && filename[len - 3..].eq_ignore_ascii_case(".md") {
        &filename[..len - 3]
    } else {
        filename
    }
}

/// Render an ISO date as the form's `YYYY-MM-DDTHH:MM` value (UTC).
pub fn iso_to_local(iso: &str) -> Option<String> {
    crate::frontmatter::parse_date(iso).map(|date| date.format("%Y-%m-%dT%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_build_changes_order_and_trimming() {
        let request = SaveRequest {
            title: Some(format!("  {}  ", "t".repeat(400))),
            description: Some(" desc ".to_string()),
            cover_url: None,
            pub_date: Some("2024-06-01T10:00:00.000Z".to_string()),
            draft: Some(true),
            tags: Some(vec![" a ".to_string(), String::new(), "b".to_string()]),
            ..SaveRequest::default()
        };
        let changes = build_changes(&request, now());
        let keys: Vec<&str> = changes.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["title", "description", "coverUrl", "pubDate", "updatedDate", "draft", "tags"]
        );
        assert_eq!(
            changes.get("title"),
            Some(&ChangeValue::Text("t".repeat(300)))
        );
        assert_eq!(changes.get("coverUrl"), Some(&ChangeValue::Text(String::new())));
        assert_eq!(changes.get("updatedDate"), Some(&ChangeValue::Date(now())));
        assert_eq!(
            changes.get("tags"),
            Some(&ChangeValue::List(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_no_pub_date_means_no_updated_date() {
        let request = SaveRequest::default();
        let changes = build_changes(&request, now());
        assert!(changes.get("updatedDate").is_none());
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_save_request_reads_camel_case() {
        let json = r#"{"path":"blog/x.md","coverUrl":null,"pubDate":"2024-01-01T00:00:00Z","contentMarkdown":"hi","draft":false}"#;
        let request: SaveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.path.as_deref(), Some("blog/x.md"));
        assert_eq!(request.cover_url, None);
        assert_eq!(request.draft, Some(false));
        assert_eq!(request.content_markdown, "hi");
    }

    #[test]
    fn test_latest_meta_prefers_stored_values() {
        let (block, _) = crate::frontmatter::parse(
            "---\ntitle: \" Stored \"\ntags: x, y\ndraft: true\npubDate: 2024-01-01T00:00\n---\n",
        );
        let changes = FrontmatterChanges::new()
            .with("title", "Requested")
            .with("description", "From request");
        let meta = latest_meta(&block, &changes);
        assert_eq!(meta.title, "Stored");
        assert_eq!(meta.description, "From request");
        assert_eq!(meta.tags, ["x", "y"]);
        assert!(meta.draft);
        assert_eq!(meta.pub_date.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(meta.updated_date, None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello, World! 2024 "), "hello-world-2024");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(&"a".repeat(250)).len(), 200);
    }

    #[test]
    fn test_make_excerpt_strips_markup() {
        let body = "# Title\n\nSome *bold* `code` text\n```\nhidden\n```\n> quoted_line";
        assert_eq!(make_excerpt(body, 140), "Title Some bold text quoted line");
        assert_eq!(make_excerpt(body, 5), "Title");
    }

    #[test]
    fn test_collect_tags_splits_commas_and_newlines() {
        assert_eq!(collect_tags("a, b\nc,, "), ["a", "b", "c"]);
    }

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("src/content/blog/", "hello"), "src/content/blog/hello.md");
        assert_eq!(post_path("", ""), "untitled.md");
    }

    #[test]
    fn test_strip_md_and_local_date() {
        assert_eq!(strip_md("post.MD"), "post");
        assert_eq!(strip_md("post"), "post");
        assert_eq!(iso_to_local("2024-03-04T05:06:07.000Z").as_deref(), Some("2024-03-04T05:06"));
    }
}
