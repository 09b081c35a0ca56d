//! View → markdown.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::view::{NodeId, NodeView, ViewSurface, ViewTree};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));
static EXTRA_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("invalid newline regex"));
static INDENTED_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+>").expect("invalid quote indent regex"));
static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"language-(\S+)").expect("invalid language class regex"));

/// Serialize the whole view to markdown.
pub fn to_markdown<S: ViewSurface + ?Sized>(surface: &S) -> String {
    let root = surface.root();
    let raw: String = surface
        .children(root)
        .iter()
        .map(|child| walk(surface, *child))
        .collect();
    let cleaned = raw.replace('\u{a0}', " ");
    let cleaned = EXTRA_NEWLINES.replace_all(&cleaned, "\n\n");
    let cleaned = INDENTED_QUOTE.replace_all(&cleaned, ">");
    strip_indentation(cleaned.trim())
}

/// Parse an HTML fragment and serialize it to markdown.
pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    to_markdown(&ViewTree::from_html(html))
}

fn walk<S: ViewSurface + ?Sized>(surface: &S, id: NodeId) -> String {
    let Some(node) = surface.node(id) else {
        return String::new();
    };
    let tag = match node {
        NodeView::Text(text) => {
            let parent_tag = surface
                .parent(id)
                .and_then(|p| surface.node(p))
                .and_then(|p| p.tag());
            return if matches!(parent_tag, Some("code" | "pre")) {
                text.to_string()
            } else {
                WHITESPACE.replace_all(text, " ").into_owned()
            };
        }
        NodeView::Element { tag, .. } => tag,
    };

    match tag {
        "pre" => return code_block(surface, id),
        "ul" | "ol" => return list(surface, id, tag == "ol"),
        _ => {}
    }

    let inner: String = surface
        .children(id)
        .iter()
        .map(|child| walk(surface, *child))
        .collect();

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            format!("{} {}\n\n", "#".repeat(level), inner.trim())
        }
        "strong" | "b" => format!("**{inner}**"),
        "em" | "i" => format!("*{inner}*"),
        "code" => {
            let parent_is_pre = surface
                .parent(id)
                .and_then(|p| surface.node(p))
                .and_then(|p| p.tag())
                == Some("pre");
            if parent_is_pre { inner } else { format!("`{inner}`") }
        }
        "blockquote" => {
            let lines: Vec<String> = inner
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| format!("> {line}"))
                .collect();
            format!("{}\n\n", lines.join("\n"))
        }
        "a" => {
            let href = node.attr("href").filter(|h| !h.is_empty()).unwrap_or("#");
            format!("[{inner}]({href})")
        }
        "br" => "  \n".to_string(),
        "p" => format!("{}\n\n", inner.trim()),
        _ => inner,
    }
}

fn code_block<S: ViewSurface + ?Sized>(surface: &S, pre: NodeId) -> String {
    let mut code: Option<NodeId> = None;
    surface.walk_nodes(pre, &mut |id: NodeId, node: NodeView<'_>| {
        if code.is_none() && id != pre && node.tag() == Some("code") {
            code = Some(id);
        }
    });

    let (raw, lang) = match code {
        Some(code) => {
            let node = surface.node(code);
            let lang = node
                .and_then(|n| n.attr("data-lang"))
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    node.and_then(|n| n.attr("class"))
                        .and_then(|class| LANGUAGE_CLASS.captures(class))
                        .map(|caps| caps[1].to_string())
                })
                .unwrap_or_default();
            (surface.get_text(code), lang)
        }
        None => {
            let raw: String = surface
                .children(pre)
                .iter()
                .map(|child| walk(surface, *child))
                .collect();
            (raw, String::new())
        }
    };
    format!("```{lang}\n{raw}\n```\n\n")
}

fn list<S: ViewSurface + ?Sized>(surface: &S, id: NodeId, ordered: bool) -> String {
    let mut out = String::new();
    let items = surface
        .children(id)
        .iter()
        .filter(|child| surface.node(**child).is_some_and(|n| n.tag().is_some()));
    for (index, item) in items.enumerate() {
        let text = walk(surface, *item);
        if ordered {
            out.push_str(&format!("{}. {}\n", index + 1, text.trim()));
        } else {
            out.push_str(&format!("- {}\n", text.trim()));
        }
    }
    out.push('\n');
    out
}

/// Strip leading indentation outside fenced code. Fence lines themselves
/// are emitted trimmed.
fn strip_indentation(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                return trimmed;
            }
            if in_fence {
                line
            } else {
                line.trim_start_matches([' ', '\t'])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
