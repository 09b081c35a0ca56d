//! Editing session: keeps the markdown source and the formatted view in step.
//!
//! An [`EditorSession`] owns one [`Document`] and the last known rich-view
//! selection. Formatting commands in rich mode go through the view's native
//! support first, fall back to manual wrapping for bold and italic, then
//! round-trip the view through markdown so it only ever shows what the
//! markdown can express.

use tracing::{debug, warn};

use crate::document::{Document, EditorMode, FormattingCommand, InlineStyle};
use crate::frontmatter::{parse_date, to_iso};
use crate::post::{PostForm, SaveRequest, SaveResponse, collect_tags, iso_to_local, post_path, strip_md};
use crate::selection::{self, Selection};
use crate::view::{Boundary, Element, NativeFormatter, ViewError, ViewRange};

#[cfg(test)]
mod tests;

/// What a formatting command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The view applied the command itself.
    Native,
    /// Bold or italic wrapped by hand after the native path declined.
    Wrapped,
    /// Markers inserted into the markdown source.
    Inserted,
    /// Nothing changed.
    Ignored,
}

#[derive(Debug, Default)]
pub struct EditorSession {
    document: Document,
    stored: Option<ViewRange>,
}

impl EditorSession {
    /// Start a session on `markdown` in markdown mode.
    pub fn load(markdown: &str) -> Self {
        Self {
            document: Document::from_markdown(markdown),
            stored: None,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub const fn mode(&self) -> EditorMode {
        self.document.mode()
    }

    pub fn markdown(&self) -> String {
        self.document.markdown()
    }

    pub const fn stored_selection(&self) -> Option<ViewRange> {
        self.stored
    }

    /// Switch the active representation, syncing the one being entered.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.document.mode() {
            return;
        }
        match mode {
            EditorMode::RichText => {
                self.document.sync_view();
                self.stored = Some(selection::caret_at_end(self.document.view()));
            }
            EditorMode::Markdown => self.document.sync_source(),
        }
        self.document.set_mode(mode);
        debug!(mode = mode.as_str(), "switched editor mode");
    }

    /// Select characters of the markdown source.
    pub fn select_source(&mut self, selection: Selection) {
        self.document.source_mut().set_selection(selection);
    }

    /// Store `range` if both endpoints lie inside the view.
    pub fn remember_selection(&mut self, range: ViewRange) -> bool {
        if selection::is_range_valid(self.document.view(), &range) {
            self.stored = Some(range);
            true
        } else {
            false
        }
    }

    /// The stored range, or a caret at the end of the view when it no
    /// longer fits the tree.
    pub fn restore_selection(&mut self) -> ViewRange {
        let view = self.document.view();
        if let Some(range) = self.stored.filter(|range| selection::is_range_valid(view, range)) {
            return range;
        }
        if self.stored.is_some() {
            debug!("stored selection is stale, moving caret to end");
        }
        let caret = selection::caret_at_end(view);
        self.stored = Some(caret);
        caret
    }

    /// The user edited the view directly.
    pub fn on_view_input(&mut self) {
        self.document.sync_source();
    }

    /// Apply a toolbar command to the active representation.
    pub fn apply_command(&mut self, command: &FormattingCommand) -> CommandOutcome {
        match self.document.mode() {
            EditorMode::Markdown => self.apply_markdown(command),
            EditorMode::RichText => self.apply_rich(command),
        }
    }

    fn apply_markdown(&mut self, command: &FormattingCommand) -> CommandOutcome {
        let Some((before, after)) = command.markdown_markers() else {
            return CommandOutcome::Ignored;
        };
        self.document.source_mut().wrap_selection(&before, &after);
        self.document.sync_view();
        CommandOutcome::Inserted
    }

    fn apply_rich(&mut self, command: &FormattingCommand) -> CommandOutcome {
        let range = self.restore_selection();
        let before = selection::capture_offsets(self.document.view(), &range);

        let outcome = match self.document.view_mut().exec_native(command, &range) {
            Ok(true) => CommandOutcome::Native,
            Ok(false) => self.wrap_manually(command, range),
            Err(ViewError::Unsupported(label)) => {
                debug!(command = label, "native formatting unavailable");
                self.wrap_manually(command, range)
            }
            Err(err) => {
                warn!(command = command.label(), error = %err, "native formatting failed");
                self.wrap_manually(command, range)
            }
        };

        let view = self.document.view();
        let current = match (outcome, self.stored) {
            (CommandOutcome::Wrapped, Some(wrapped)) => Some(wrapped),
            _ => before.map(|offsets| selection::restore_from_offsets(view, offsets)),
        };
        let offsets = current.and_then(|range| {
            self.remember_selection(range);
            selection::capture_offsets(self.document.view(), &range)
        });

        self.document.sync_source();
        self.document.sync_view();

        let view = self.document.view();
        let restored = offsets.map_or_else(
            || selection::caret_at_end(view),
            |offsets| selection::restore_from_offsets(view, offsets),
        );
        self.stored = Some(restored);
        outcome
    }

    /// Surround the range with `strong`/`em` by hand. Collapsed ranges and
    /// other commands are left alone.
    fn wrap_manually(&mut self, command: &FormattingCommand, range: ViewRange) -> CommandOutcome {
        let style = match command {
            FormattingCommand::Inline(style @ (InlineStyle::Bold | InlineStyle::Italic)) => *style,
            _ => return CommandOutcome::Ignored,
        };
        if range.is_collapsed() {
            return CommandOutcome::Ignored;
        }
        let view = self.document.view_mut();
        match view.surround_contents(&range, Element::new(style.tag())) {
            Ok(wrapper) => {
                view.normalize();
                if view.is_connected(wrapper) {
                    let inside = ViewRange::new(
                        Boundary::new(wrapper, 0),
                        Boundary::new(wrapper, view.children(wrapper).len()),
                    );
                    self.stored = Some(inside);
                }
                CommandOutcome::Wrapped
            }
            Err(err) => {
                debug!(error = %err, "could not wrap selection");
                CommandOutcome::Ignored
            }
        }
    }

    /// Sync the inactive side and build a save request from the form.
    pub fn save_request(&mut self, form: &PostForm) -> SaveRequest {
        self.document.sync_inactive();
        let cover = form.cover_url.trim();
        SaveRequest {
            path: Some(post_path(&form.content_dir, &form.slug)),
            title: Some(form.title.trim().to_string()),
            description: Some(form.description.trim().to_string()),
            cover_url: (!cover.is_empty()).then(|| cover.to_string()),
            pub_date: parse_date(&form.pub_date).map(|date| to_iso(&date)),
            draft: Some(form.draft),
            tags: Some(collect_tags(&form.tags_input)),
            content_markdown: self.document.markdown(),
        }
    }

    /// Copy the persisted metadata back into the form and mark the document
    /// clean.
    pub fn apply_save_response(&mut self, form: &mut PostForm, response: &SaveResponse) {
        let meta = &response.meta;
        form.filename.clone_from(&response.filename);
        form.slug = strip_md(&response.filename).to_string();
        form.title.clone_from(&meta.title);
        form.description.clone_from(&meta.description);
        form.cover_url.clone_from(&meta.cover_url);
        form.tags_input = meta.tags.join(", ");
        form.pub_date = meta
            .pub_date
            .as_deref()
            .and_then(iso_to_local)
            .unwrap_or_default();
        form.draft = meta.draft;
        self.document.mark_clean();
    }
}
