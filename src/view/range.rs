//! Boundary points and ranges.

use std::cmp::Ordering;

use super::surface::{NodeView, ViewSurface};
use super::tree::NodeId;

/// A position in the view: a character offset inside a text node, or a
/// child index inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A pair of boundaries, start not after end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub start: Boundary,
    pub end: Boundary,
}

impl ViewRange {
    pub const fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub const fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Document-order comparison of two boundary points.
pub fn compare_points<S: ViewSurface + ?Sized>(surface: &S, a: Boundary, b: Boundary) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    let path_a = path_from_root(surface, a.node);
    let path_b = path_from_root(surface, b.node);

    if path_a == path_b {
        // Distinct nodes on the same path: one of them is detached.
        return Ordering::Equal;
    }
    if path_b.starts_with(&path_a) {
        // a.node is an ancestor of b.node
        return if path_b[path_a.len()] < a.offset {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if path_a.starts_with(&path_b) {
        return if path_a[path_b.len()] < b.offset {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    path_a.cmp(&path_b)
}

fn path_from_root<S: ViewSurface + ?Sized>(surface: &S, node: NodeId) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = surface.parent(current) {
        let index = surface
            .children(parent)
            .iter()
            .position(|c| *c == current)
            .unwrap_or_default();
        path.push(index);
        current = parent;
    }
    path.reverse();
    path
}

/// Plain text covered by `range`, in document order.
pub fn range_text<S: ViewSurface + ?Sized>(surface: &S, range: &ViewRange) -> String {
    let mut out = String::new();
    surface.walk_nodes(surface.root(), &mut |id: NodeId, node: NodeView<'_>| {
        let NodeView::Text(text) = node else {
            return;
        };
        let len = text.chars().count();
        let lo = local_offset(surface, id, len, range.start);
        let hi = local_offset(surface, id, len, range.end);
        if hi > lo {
            out.extend(text.chars().skip(lo).take(hi - lo));
        }
    });
    out
}

/// Where `point` falls inside a text node, clamped to `[0, len]`.
fn local_offset<S: ViewSurface + ?Sized>(
    surface: &S,
    text_node: NodeId,
    len: usize,
    point: Boundary,
) -> usize {
    if point.node == text_node {
        return point.offset.min(len);
    }
    match compare_points(surface, point, Boundary::new(text_node, 0)) {
        Ordering::Less | Ordering::Equal => 0,
        Ordering::Greater => len,
    }
}
