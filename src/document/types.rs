//! Core document types.

use serde::{Deserialize, Serialize};

use crate::editor::EditorBuffer;
use crate::markdown::{render_view, to_markdown};
use crate::view::ViewTree;

/// Which representation the author is editing.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Markdown,
    #[value(name = "rich")]
    #[serde(rename = "rich")]
    RichText,
}

impl EditorMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::RichText => "rich",
        }
    }
}

/// A document held in both representations.
///
/// Only the representation matching `mode` is authoritative; the other is
/// brought up to date by [`Document::sync_view`] or
/// [`Document::sync_source`].
#[derive(Debug)]
pub struct Document {
    /// Markdown source
    source: EditorBuffer,
    /// Formatted view
    view: ViewTree,
    /// Active representation
    mode: EditorMode,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self::from_markdown("")
    }

    /// Create a document from markdown, with the view pre-rendered.
    pub fn from_markdown(markdown: &str) -> Self {
        Self {
            source: EditorBuffer::from_text(markdown),
            view: render_view(markdown),
            mode: EditorMode::Markdown,
        }
    }

    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    pub(crate) const fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    pub const fn source(&self) -> &EditorBuffer {
        &self.source
    }

    pub const fn source_mut(&mut self) -> &mut EditorBuffer {
        &mut self.source
    }

    pub const fn view(&self) -> &ViewTree {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut ViewTree {
        &mut self.view
    }

    /// The markdown text.
    pub fn markdown(&self) -> String {
        self.source.text()
    }

    /// Re-render the view from the markdown source.
    pub fn sync_view(&mut self) {
        let markdown = self.source.text();
        self.view.set_inner_html(&crate::markdown::render_html(&markdown));
    }

    /// Re-serialize the markdown source from the view.
    pub fn sync_source(&mut self) {
        let markdown = to_markdown(&self.view);
        self.source.replace_all(&markdown);
    }

    /// Bring the inactive representation up to date.
    pub fn sync_inactive(&mut self) {
        match self.mode {
            EditorMode::Markdown => self.sync_view(),
            EditorMode::RichText => self.sync_source(),
        }
    }

    /// Whether the markdown source changed since load or the last save.
    pub const fn is_dirty(&self) -> bool {
        self.source.is_dirty()
    }

    pub const fn mark_clean(&mut self) {
        self.source.mark_clean();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
