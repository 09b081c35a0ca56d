//! HTML fragment reader and writer for the view tree.
//!
//! The reader is forgiving in the way browsers are for the small tag set
//! the renderer produces: unknown tags are kept, stray close tags are
//! ignored and unclosed elements end with the fragment.

use super::is_void;
use super::tree::{Element, NodeId, NodeKind, ViewTree};

pub(crate) fn parse_into(tree: &mut ViewTree, root: NodeId, html: &str) {
    let mut stack: Vec<NodeId> = vec![root];
    let mut text = String::new();
    let bytes = html.as_bytes();
    let mut pos = 0;

    while pos < html.len() {
        let Some(rel) = html[pos..].find('<') else {
            text.push_str(&html[pos..]);
            break;
        };
        text.push_str(&html[pos..pos + rel]);
        pos += rel;

        let rest = &html[pos..];
        if rest.starts_with("<!--") {
            flush_text(tree, &stack, &mut text);
            pos = rest.find("-->").map_or(html.len(), |end| pos + end + 3);
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        match next {
            Some(b'/') => {
                let Some(close) = rest.find('>') else {
                    text.push_str(rest);
                    break;
                };
                flush_text(tree, &stack, &mut text);
                let name = rest[2..close].trim().to_ascii_lowercase();
                close_element(tree, &mut stack, &name);
                pos += close + 1;
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let Some((element, self_closing, consumed)) = read_open_tag(rest) else {
                    text.push_str(rest);
                    break;
                };
                flush_text(tree, &stack, &mut text);
                let void = is_void(&element.tag);
                let parent = *stack.last().unwrap_or(&root);
                let id = tree.create_element(element);
                tree.append_child(parent, id);
                if !void && !self_closing {
                    stack.push(id);
                }
                pos += consumed;
            }
            _ => {
                text.push('<');
                pos += 1;
            }
        }
    }
    flush_text(tree, &stack, &mut text);
}

fn flush_text(tree: &mut ViewTree, stack: &[NodeId], text: &mut String) {
    if text.is_empty() {
        return;
    }
    let decoded = decode_entities(text);
    text.clear();
    if let Some(&parent) = stack.last() {
        let node = tree.create_text(decoded);
        tree.append_child(parent, node);
    }
}

fn close_element(tree: &ViewTree, stack: &mut Vec<NodeId>, name: &str) {
    // Index 0 is the root container and never closes.
    let Some(depth) = stack
        .iter()
        .skip(1)
        .rposition(|id| tree.tag(*id) == Some(name))
    else {
        return;
    };
    stack.truncate(depth + 1);
}

/// Parse `<tag attr="v" ...>` at the start of `input`. Returns the element,
/// whether it was self-closing and the number of bytes consumed.
fn read_open_tag(input: &str) -> Option<(Element, bool, usize)> {
    let bytes = input.as_bytes();
    let mut pos = 1;
    let name_end = input[pos..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .map_or(input.len(), |n| pos + n);
    let mut element = Element::new(&input[pos..name_end]);
    pos = name_end;

    loop {
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        match bytes.get(pos)? {
            b'>' => return Some((element, false, pos + 1)),
            b'/' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'>') {
                    return Some((element, true, pos + 1));
                }
            }
            _ => {
                let attr_end = input[pos..]
                    .find(|c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/'))
                    .map_or(input.len(), |n| pos + n);
                let name = input[pos..attr_end].to_string();
                pos = attr_end;
                while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
                    pos += 1;
                }
                let mut value = String::new();
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
                        pos += 1;
                    }
                    match bytes.get(pos)? {
                        quote @ (b'"' | b'\'') => {
                            let close = input[pos + 1..].find(char::from(*quote))?;
                            value = decode_entities(&input[pos + 1..pos + 1 + close]);
                            pos += close + 2;
                        }
                        _ => {
                            let end = input[pos..]
                                .find(|c: char| c.is_ascii_whitespace() || c == '>')
                                .map_or(input.len(), |n| pos + n);
                            value = decode_entities(&input[pos..end]);
                            pos = end;
                        }
                    }
                }
                if !name.is_empty() {
                    element.set_attr(name, value);
                }
            }
        }
    }
}

/// Decode the named entities the renderer emits plus numeric references.
/// Anything unrecognised is kept literally.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..]
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..=semi]).map(|c| (c, semi + 2)));
        if let Some((c, consumed)) = decoded {
            out.push(c);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code).filter(|c| *c != '\0')
        }
    }
}

pub(crate) fn write_children(tree: &ViewTree, id: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(id) {
        write_node(tree, *child, &mut out);
    }
    out
}

fn write_node(tree: &ViewTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        Some(NodeKind::Text(text)) => escape_into(text, false, out),
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            if is_void(&element.tag) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in tree.children(id) {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let tree = ViewTree::from_html("<p>a <strong>b</strong></p><ul><li>x</li></ul>");
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.inner_html(), "<p>a <strong>b</strong></p><ul><li>x</li></ul>");
    }

    #[test]
    fn test_parse_decodes_entities() {
        let tree = ViewTree::from_html("<p>&lt;b&gt; &amp; &quot;q&quot; &#39;s&#39; &#x41;&#66;&nbsp;</p>");
        assert_eq!(tree.text_content(tree.root()), "<b> & \"q\" 's' AB\u{a0}");
    }

    #[test]
    fn test_unknown_entity_is_literal() {
        assert_eq!(decode_entities("a &bogus; & b"), "a &bogus; & b");
        assert_eq!(decode_entities("&#0;"), "&#0;");
    }

    #[test]
    fn test_parse_attributes_and_void_tags() {
        let tree = ViewTree::from_html(
            "<a HREF=\"https://x.io/?a=1&amp;b=2\" target=_blank>go</a><br><img src='i.png'/>",
        );
        let root = tree.root();
        let link = tree.children(root)[0];
        assert_eq!(tree.attr(link, "href"), Some("https://x.io/?a=1&b=2"));
        assert_eq!(tree.attr(link, "target"), Some("_blank"));
        assert_eq!(tree.children(root).len(), 3);
        assert!(tree.children(tree.children(root)[1]).is_empty());
    }

    #[test]
    fn test_mismatched_close_pops_to_match() {
        let tree = ViewTree::from_html("<p><em>a</p>b");
        assert_eq!(tree.inner_html(), "<p><em>a</em></p>b");
    }

    #[test]
    fn test_stray_close_is_ignored() {
        let tree = ViewTree::from_html("a</div>b");
        assert_eq!(tree.text_content(tree.root()), "ab");
    }

    #[test]
    fn test_comments_are_dropped() {
        let tree = ViewTree::from_html("a<!-- hidden -->b");
        assert_eq!(tree.text_content(tree.root()), "ab");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let tree = ViewTree::from_html("1 < 2");
        assert_eq!(tree.text_content(tree.root()), "1 < 2");
        assert_eq!(tree.inner_html(), "1 &lt; 2");
    }

    #[test]
    fn test_writer_escapes_attributes() {
        let mut tree = ViewTree::new();
        let a = tree.create_element(Element::new("a").with_attr("href", "x\"><script>"));
        let root = tree.root();
        tree.append_child(root, a);
        assert_eq!(tree.inner_html(), "<a href=\"x&quot;&gt;&lt;script&gt;\"></a>");
    }
}
