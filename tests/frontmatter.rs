use chrono::{TimeZone, Utc};
use twinmark::frontmatter::{
    self, FrontmatterChanges, FrontmatterValue, has_frontmatter, parse, split, update,
};

const POST: &str = include_str!("fixtures/post.md");

#[test]
fn test_fixture_parses_typed_values() {
    let (block, body) = parse(POST);
    assert_eq!(block.len(), 7);
    assert_eq!(block.get_str("title"), Some("Building a Tiny Markdown Editor"));
    assert_eq!(block.get_bool("draft"), Some(false));
    assert_eq!(
        block.get("pubDate").and_then(FrontmatterValue::as_date),
        Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap()).as_ref()
    );
    assert_eq!(
        block.get("tags").and_then(FrontmatterValue::as_list),
        Some(&["rust".to_string(), "editors".to_string(), "markdown".to_string()][..])
    );
    assert_eq!(block.get_str("coverUrl"), Some(""));
    assert!(body.starts_with("\n# Building"));
}

#[test]
fn test_fixture_serializes_in_file_order() {
    let (block, _) = parse(POST);
    let json = serde_json::to_string(&block).unwrap();
    assert!(json.starts_with("{\"title\":\"Building a Tiny Markdown Editor\",\"description\":"));
    assert!(json.contains("\"pubDate\":\"2024-03-10T09:30:00.000Z\""));
    assert!(json.contains("\"tags\":[\"rust\",\"editors\",\"markdown\"]"));
}

#[test]
fn test_empty_update_is_identity() {
    let (fm, _) = split(POST);
    let fm = fm.unwrap();
    assert_eq!(update(fm, &FrontmatterChanges::new()), fm);
}

#[test]
fn test_selective_update_touches_only_named_keys() {
    let (fm, _) = split(POST);
    let fm = fm.unwrap();
    let changes = FrontmatterChanges::new()
        .with("draft", true)
        .with("tags", vec!["rust".to_string()]);
    let updated = update(fm, &changes);

    let before: Vec<&str> = fm.split('\n').collect();
    let after: Vec<&str> = updated.split('\n').collect();
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        if old.starts_with("draft:") {
            assert_eq!(*new, "draft: true");
        } else if old.starts_with("tags:") {
            assert_eq!(*new, "tags: [\"rust\"]");
        } else {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn test_unclosed_block_is_body() {
    let raw = "---\ntitle: x\nno close";
    assert!(!has_frontmatter(raw));
    let (block, body) = parse(raw);
    assert!(block.is_empty());
    assert_eq!(body, raw);
}

#[test]
fn test_crlf_lines_survive_update() {
    let fm = "title: \"a\"\r\ncustom: b\r\ndraft: false";
    let changes = FrontmatterChanges::new().with("draft", true);
    assert_eq!(
        frontmatter::update(fm, &changes),
        "title: \"a\"\r\ncustom: b\r\ndraft: true"
    );
}
