//! Conversion between markdown and the formatted view.
//!
//! The grammar is deliberately small: headings, paragraphs with forced line
//! breaks, blockquotes, flat lists, fenced code, and the four inline spans
//! (strong, emphasis, code, links). Anything else is plain text.
//!
//! Converting markdown to the view and back is lossy but settles after one
//! pass: a second round trip reproduces the first.

mod render;
mod serialize;

pub use render::{escape_html, render_html, render_view};
pub use serialize::{html_to_markdown, to_markdown};

/// Run markdown through the view and back.
pub fn roundtrip(markdown: &str) -> String {
    to_markdown(&render_view(markdown))
}
