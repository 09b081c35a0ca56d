//! Selection/offset mapping.
//!
//! A rich-view selection is a pair of boundary points inside the view tree.
//! Re-rendering the view replaces every node, so a selection cannot survive
//! a re-render as-is. This module maps a view range to plain-text character
//! offsets (counted over the concatenated text of the view) and back.
//!
//! If the visible text length is unchanged by the re-render, restoring from
//! captured offsets reproduces the caret exactly. Otherwise offsets are
//! clamped to the end of the content.

use serde::{Deserialize, Serialize};

use crate::view::{Boundary, NodeId, NodeView, ViewRange, ViewSurface};

/// Character offsets into the plain text of a view, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection, ordering the endpoints.
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub const fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub const fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Clamp both endpoints to `[0, len]`.
    #[must_use]
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Both endpoints are connected and inside the view root.
pub fn is_range_valid<S: ViewSurface + ?Sized>(surface: &S, range: &ViewRange) -> bool {
    let root = surface.root();
    [range.start, range.end].iter().all(|point| {
        surface.is_connected(point.node)
            && surface.contains(root, point.node)
            && point.offset <= surface.node_length(point.node)
    })
}

/// Map a view range to plain-text offsets.
///
/// Returns `None` when the range does not lie inside the view.
pub fn capture_offsets<S: ViewSurface + ?Sized>(surface: &S, range: &ViewRange) -> Option<Selection> {
    if !is_range_valid(surface, range) {
        return None;
    }
    let origin = Boundary::new(surface.root(), 0);
    let start = surface.create_range(origin, range.start)?;
    let end = surface.create_range(origin, range.end)?;
    Some(Selection::new(
        surface.range_text(&start).chars().count(),
        surface.range_text(&end).chars().count(),
    ))
}

/// Locate the text position `offset` characters into the view.
///
/// An offset that falls exactly between two text nodes resolves to the end
/// of the first one. Offsets past the end resolve to the end of the root.
pub fn text_point_at_offset<S: ViewSurface + ?Sized>(surface: &S, offset: usize) -> Boundary {
    let root = surface.root();
    let mut remaining = offset;
    let mut found: Option<Boundary> = None;
    surface.walk_nodes(root, &mut |id: NodeId, node: NodeView<'_>| {
        if found.is_some() {
            return;
        }
        if let NodeView::Text(text) = node {
            let len = text.chars().count();
            if remaining <= len {
                found = Some(Boundary::new(id, remaining));
            } else {
                remaining -= len;
            }
        }
    });
    found.unwrap_or_else(|| Boundary::new(root, surface.children(root).len()))
}

/// Build a range from plain-text offsets.
pub fn restore_from_offsets<S: ViewSurface + ?Sized>(surface: &S, selection: Selection) -> ViewRange {
    let start = text_point_at_offset(surface, selection.start);
    let end = text_point_at_offset(surface, selection.end);
    surface
        .create_range(start, end)
        .unwrap_or_else(|| caret_at_end(surface))
}

/// A collapsed range after the last child of the root.
pub fn caret_at_end<S: ViewSurface + ?Sized>(surface: &S) -> ViewRange {
    let root = surface.root();
    ViewRange::collapsed(Boundary::new(root, surface.children(root).len()))
}

/// Length in characters of the visible text of the view.
pub fn text_len<S: ViewSurface + ?Sized>(surface: &S) -> usize {
    surface.get_text(surface.root()).chars().count()
}
