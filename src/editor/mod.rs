//! Markdown source buffer.
//!
//! Provides a rope-backed text buffer with a character-offset selection,
//! used as the markdown side of an editing session.

mod buffer;

pub use buffer::EditorBuffer;
