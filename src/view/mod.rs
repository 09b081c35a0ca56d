//! In-memory formatted view.
//!
//! This module provides the rich side of the editor:
//! - An arena tree of elements and text nodes ([`ViewTree`])
//! - An HTML fragment reader/writer for that tree
//! - Boundary points and ranges over the tree
//! - The [`ViewSurface`] capability trait the serializer and offset mapper
//!   are written against
//! - Native formatting commands for the in-memory tree

mod html;
mod native;
mod range;
mod surface;
mod tree;

pub use native::NativeFormatter;
pub use range::{Boundary, ViewRange, compare_points, range_text};
pub use surface::{NodeView, ViewSurface};
pub use tree::{Element, NodeId, NodeKind, ViewTree};

/// Errors raised by view mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The surface has no native implementation for the command.
    #[error("formatting command `{0}` is not supported by this surface")]
    Unsupported(&'static str),
    /// A range endpoint is detached, stale, or outside the view root.
    #[error("range does not lie inside the view")]
    InvalidRange,
}

/// Elements that never have children.
pub(crate) const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Inline containers that `normalize` removes once they are empty.
pub(crate) const INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "code", "a", "span", "u", "s"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}
