use ropey::Rope;

use crate::selection::Selection;

/// The markdown source of a document, backed by a rope.
///
/// Selection offsets count characters, not bytes, matching the offsets the
/// rich view uses.
pub struct EditorBuffer {
    rope: Rope,
    selection: Selection,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::caret(0),
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current selection.
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of the buffer in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text covered by the selection.
    pub fn selected_text(&self) -> String {
        self.rope
            .slice(self.selection.start..self.selection.end)
            .to_string()
    }

    /// Set the selection, clamped to the buffer and ordered.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.len_chars());
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self) {
        self.selection = Selection::new(0, self.len_chars());
    }

    /// Replace the whole content, e.g. after serializing the rich view.
    ///
    /// The selection is clamped to the new length.
    pub fn replace_all(&mut self, text: &str) {
        if self.rope == text {
            return;
        }
        self.rope = Rope::from_str(text);
        self.selection = self.selection.clamp(self.len_chars());
        self.dirty = true;
    }

    /// Replace the selection with `text` and put the caret after it.
    pub fn insert_str(&mut self, text: &str) {
        let Selection { start, end } = self.selection;
        if start == end && text.is_empty() {
            return;
        }
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.selection = Selection::caret(start + text.chars().count());
        self.dirty = true;
    }

    /// Surround the selection with `before` and `after`. The caret ends up
    /// after the whole replacement.
    pub fn wrap_selection(&mut self, before: &str, after: &str) {
        let selected = self.selected_text();
        self.insert_str(&format!("{before}{selected}{after}"));
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_text_roundtrip() {
        let content = "line one\nline two\nline three";
        let buf = EditorBuffer::from_text(content);
        assert_eq!(buf.text(), content);
        assert_eq!(buf.line_count(), 3);
    }

    #[test]
    fn test_new_buffer_is_clean() {
        let buf = EditorBuffer::from_text("hello");
        assert!(!buf.is_dirty());
        assert_eq!(buf.selection(), Selection::caret(0));
    }

    // --- Selection ---

    #[test]
    fn test_set_selection_clamps_and_orders() {
        let mut buf = EditorBuffer::from_text("héllo");
        buf.set_selection(Selection::new(9, 2));
        assert_eq!(buf.selection(), Selection::new(2, 5));
        assert_eq!(buf.selected_text(), "llo");
    }

    #[test]
    fn test_select_all() {
        let mut buf = EditorBuffer::from_text("abc");
        buf.select_all();
        assert_eq!(buf.selected_text(), "abc");
    }

    // --- Editing ---

    #[test]
    fn test_wrap_selection_places_caret_after_replacement() {
        let mut buf = EditorBuffer::from_text("make this bold");
        buf.set_selection(Selection::new(10, 14));
        buf.wrap_selection("**", "**");
        assert_eq!(buf.text(), "make this **bold**");
        assert_eq!(buf.selection(), Selection::caret(18));
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_wrap_collapsed_selection_inserts_markers() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.set_selection(Selection::caret(1));
        buf.wrap_selection("## ", "");
        assert_eq!(buf.text(), "a## b");
        assert_eq!(buf.selection(), Selection::caret(4));
    }

    #[test]
    fn test_wrap_counts_multibyte_chars() {
        let mut buf = EditorBuffer::from_text("日本語");
        buf.set_selection(Selection::new(1, 2));
        buf.wrap_selection("*", "*");
        assert_eq!(buf.text(), "日*本*語");
        assert_eq!(buf.selection(), Selection::caret(4));
    }

    #[test]
    fn test_replace_all_clamps_selection() {
        let mut buf = EditorBuffer::from_text("long content here");
        buf.set_selection(Selection::caret(15));
        buf.replace_all("short");
        assert_eq!(buf.selection(), Selection::caret(5));
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_replace_all_with_same_text_stays_clean() {
        let mut buf = EditorBuffer::from_text("same");
        buf.replace_all("same");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_mark_clean_resets_dirty() {
        let mut buf = EditorBuffer::from_text("x");
        buf.insert_str("y");
        assert!(buf.is_dirty());
        buf.mark_clean();
        assert!(!buf.is_dirty());
    }
}
