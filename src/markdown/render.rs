//! Markdown → safe markup.
//!
//! The whole input is HTML-escaped before any rule runs, so every tag in
//! the output comes from this module.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::view::ViewTree;

/// Fenced code blocks are swapped for `NUL CODE n NUL` while the other rules
/// run. NUL is stripped from the input, so text cannot forge a token.
const TOKEN_MARK: char = '\0';

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```([a-z0-9+\-]*)\n(.*?)```").expect("invalid code fence regex")
});
static HEADINGS: Lazy<Vec<Regex>> = Lazy::new(|| {
    (1..=6)
        .rev()
        .map(|level| {
            Regex::new(&format!(r"(?m)^#{{{level}}} (.*)$")).expect("invalid heading regex")
        })
        .collect()
});
static QUOTE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&gt; ?").expect("invalid blockquote regex"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.[ \t]+").expect("invalid ordered list regex"));
static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*][ \t]+").expect("invalid unordered list regex"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid strong regex"));
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("invalid emphasis regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+?)`").expect("invalid inline code regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+?)\]\(([^)]+?)\)").expect("invalid link regex"));
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("invalid paragraph regex"));
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x00CODE(\d+)\x00").expect("invalid placeholder regex"));
static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(h\d|pre|blockquote|ul|ol)").expect("invalid block regex"));

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let cleaned: String = markdown.replace("\r\n", "\n").replace(TOKEN_MARK, "");
    let escaped = escape_html(&cleaned);

    let mut code_blocks: Vec<String> = Vec::new();
    let text = CODE_FENCE.replace_all(&escaped, |caps: &Captures<'_>| {
        let lang = caps[1].trim();
        let code = &caps[2];
        let code = code.strip_suffix('\n').unwrap_or(code);
        let attrs = if lang.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{lang}\" data-lang=\"{lang}\"")
        };
        let token = placeholder(code_blocks.len());
        code_blocks.push(format!("<pre><code{attrs}>{code}</code></pre>"));
        standalone(&token)
    });

    let mut text = text.into_owned();
    for (index, heading) in HEADINGS.iter().enumerate() {
        let level = 6 - index;
        text = heading
            .replace_all(&text, format!("\n\n<h{level}>${{1}}</h{level}>\n\n").as_str())
            .into_owned();
    }

    let text = collapse_blockquotes(&text);
    let text = collapse_lists(&text, &ORDERED_ITEM, "ol");
    let text = collapse_lists(&text, &UNORDERED_ITEM, "ul");

    let text = STRONG.replace_all(&text, "<strong>${1}</strong>");
    let text = EMPHASIS.replace_all(&text, "<em>${1}</em>");
    let text = INLINE_CODE.replace_all(&text, "<code>${1}</code>");
    let text = LINK.replace_all(&text, |caps: &Captures<'_>| {
        format!(
            "<a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a>",
            safe_href(&caps[2]),
            &caps[1]
        )
    });

    let html = PARAGRAPH_BREAK
        .split(&text)
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n");

    PLACEHOLDER
        .replace_all(&html, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| code_blocks.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Render markdown straight into a fresh view tree.
pub fn render_view(markdown: &str) -> ViewTree {
    ViewTree::from_html(&render_html(markdown))
}

/// Surround a block with blank lines so it never shares a paragraph with
/// neighbouring text.
fn standalone(block: &str) -> String {
    format!("\n\n{block}\n\n")
}

fn placeholder(index: usize) -> String {
    format!("{TOKEN_MARK}CODE{index}{TOKEN_MARK}")
}

fn render_block(block: &str) -> Option<String> {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return None;
    }
    let is_placeholder = PLACEHOLDER
        .find(trimmed)
        .is_some_and(|m| m.start() == 0 && m.end() == trimmed.len());
    if is_placeholder || BLOCK_START.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    let lines: Vec<&str> = trimmed.split('\n').map(str::trim_end).collect();
    Some(format!("<p>{}</p>", lines.join("<br/>")))
}

/// Runs of adjacent lines matching `is_member`, with everything else passed
/// through. `collapse` turns a run into its replacement line.
fn group_lines(
    text: &str,
    is_member: impl Fn(&str) -> bool,
    collapse: impl Fn(&[&str]) -> String,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if is_member(line) {
            run.push(line);
            continue;
        }
        if !run.is_empty() {
            out.push(collapse(&run));
            run.clear();
        }
        out.push(line.to_string());
    }
    if !run.is_empty() {
        out.push(collapse(&run));
    }
    out.join("\n")
}

fn collapse_blockquotes(text: &str) -> String {
    group_lines(
        text,
        |line| line.starts_with("&gt;"),
        |run| {
            let body: Vec<String> = run
                .iter()
                .map(|line| QUOTE_LINE.replace(line, "").into_owned())
                .collect();
            standalone(&format!("<blockquote>{}</blockquote>", body.join("<br/>")))
        },
    )
}

fn collapse_lists(text: &str, marker: &Regex, tag: &str) -> String {
    group_lines(
        text,
        |line| marker.is_match(line),
        |run| {
            let items: Vec<String> = run
                .iter()
                .map(|line| marker.replace(line, "").trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            if items.is_empty() {
                return run.join("\n");
            }
            let body: String = items.iter().map(|item| format!("<li>{item}</li>")).collect();
            standalone(&format!("<{tag}>{body}</{tag}>"))
        },
    )
}

/// Link targets with a script-capable scheme become `#`.
fn safe_href(href: &str) -> String {
    let probe: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|scheme| probe.starts_with(scheme)) {
        "#".to_string()
    } else {
        href.to_string()
    }
}
