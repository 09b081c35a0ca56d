//! Formatting commands shared by both editing modes.

/// Inline text styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Code,
}

impl InlineStyle {
    /// Element the rich view uses for this style.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Bold => "strong",
            Self::Italic => "em",
            Self::Code => "code",
        }
    }

    /// Tags that count as "already styled" when toggling.
    pub const fn matching_tags(self) -> &'static [&'static str] {
        match self {
            Self::Bold => &["strong", "b"],
            Self::Italic => &["em", "i"],
            Self::Code => &["code"],
        }
    }

    /// Markdown marker placed on both sides of the selection.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
            Self::Code => "`",
        }
    }
}

/// Block-level styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockStyle {
    /// Heading level, clamped to 1..=6 when applied.
    Heading(u8),
    BulletList,
    OrderedList,
    Quote,
    Paragraph,
    CodeBlock,
}

impl BlockStyle {
    pub const fn heading_level(level: u8) -> u8 {
        if level < 1 {
            1
        } else if level > 6 {
            6
        } else {
            level
        }
    }

    /// Element tag for styles that map to a single element.
    pub fn tag(self) -> String {
        match self {
            Self::Heading(level) => format!("h{}", Self::heading_level(level)),
            Self::BulletList => "ul".to_string(),
            Self::OrderedList => "ol".to_string(),
            Self::Quote => "blockquote".to_string(),
            Self::Paragraph => "p".to_string(),
            Self::CodeBlock => "pre".to_string(),
        }
    }
}

/// A toolbar command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingCommand {
    Inline(InlineStyle),
    Block(BlockStyle),
    InsertLink { href: String },
}

impl FormattingCommand {
    pub const fn bold() -> Self {
        Self::Inline(InlineStyle::Bold)
    }

    pub const fn italic() -> Self {
        Self::Inline(InlineStyle::Italic)
    }

    pub const fn heading(level: u8) -> Self {
        Self::Block(BlockStyle::Heading(level))
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::InsertLink { href: href.into() }
    }

    /// Short name used in logs and errors.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Inline(InlineStyle::Bold) => "bold",
            Self::Inline(InlineStyle::Italic) => "italic",
            Self::Inline(InlineStyle::Code) => "code",
            Self::Block(BlockStyle::Heading(_)) => "heading",
            Self::Block(BlockStyle::BulletList) => "bullet-list",
            Self::Block(BlockStyle::OrderedList) => "ordered-list",
            Self::Block(BlockStyle::Quote) => "quote",
            Self::Block(BlockStyle::Paragraph) => "paragraph",
            Self::Block(BlockStyle::CodeBlock) => "code-block",
            Self::InsertLink { .. } => "link",
        }
    }

    /// Text inserted before and after the selection in markdown mode.
    ///
    /// `Paragraph` has no markdown marker and returns `None`.
    pub fn markdown_markers(&self) -> Option<(String, String)> {
        match self {
            Self::Inline(style) => Some((style.marker().to_string(), style.marker().to_string())),
            Self::Block(BlockStyle::Heading(level)) => Some((
                format!("{} ", "#".repeat(usize::from(BlockStyle::heading_level(*level)))),
                String::new(),
            )),
            Self::Block(BlockStyle::BulletList) => Some(("- ".to_string(), String::new())),
            Self::Block(BlockStyle::OrderedList) => Some(("1. ".to_string(), String::new())),
            Self::Block(BlockStyle::Quote) => Some(("> ".to_string(), String::new())),
            Self::Block(BlockStyle::CodeBlock) => Some(("```\n".to_string(), "\n```".to_string())),
            Self::Block(BlockStyle::Paragraph) => None,
            Self::InsertLink { href } => Some(("[".to_string(), format!("]({href})"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(BlockStyle::Heading(0).tag(), "h1");
        assert_eq!(BlockStyle::Heading(9).tag(), "h6");
        assert_eq!(
            FormattingCommand::heading(3).markdown_markers(),
            Some(("### ".to_string(), String::new()))
        );
    }

    #[test]
    fn test_link_markers_carry_href() {
        let markers = FormattingCommand::link("https://a.io").markdown_markers();
        assert_eq!(markers, Some(("[".to_string(), "](https://a.io)".to_string())));
    }

    #[test]
    fn test_paragraph_has_no_markers() {
        assert_eq!(FormattingCommand::Block(BlockStyle::Paragraph).markdown_markers(), None);
    }
}
