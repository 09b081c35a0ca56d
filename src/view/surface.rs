//! Capability trait over a formatted view.

use std::cmp::Ordering;

use super::range::{Boundary, ViewRange, compare_points, range_text};
use super::tree::NodeId;

/// Borrowed view of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeView<'a> {
    Text(&'a str),
    Element {
        tag: &'a str,
        attrs: &'a [(String, String)],
    },
}

impl<'a> NodeView<'a> {
    pub const fn tag(&self) -> Option<&'a str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    pub const fn text(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element { .. } => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match self {
            Self::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Self::Text(_) => None,
        }
    }
}

/// What the serializer and the offset mapper need from a view.
///
/// Implementors provide structure; text extraction, traversal and range
/// construction come for free.
pub trait ViewSurface {
    fn root(&self) -> NodeId;
    fn node(&self, id: NodeId) -> Option<NodeView<'_>>;
    fn parent(&self, id: NodeId) -> Option<NodeId>;
    fn children(&self, id: NodeId) -> &[NodeId];
    fn is_connected(&self, id: NodeId) -> bool;

    /// Pre-order walk of the subtree rooted at `from`.
    fn walk_nodes(&self, from: NodeId, visit: &mut dyn FnMut(NodeId, NodeView<'_>)) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            visit(id, node);
            stack.extend(self.children(id).iter().rev().copied());
        }
    }

    /// Plain text of a subtree.
    fn get_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.walk_nodes(id, &mut |_, node: NodeView<'_>| {
            if let Some(text) = node.text() {
                out.push_str(text);
            }
        });
        out
    }

    /// Text covered by a range.
    fn range_text(&self, range: &ViewRange) -> String {
        range_text(self, range)
    }

    /// Characters for text nodes, children for elements.
    fn node_length(&self, id: NodeId) -> usize {
        match self.node(id) {
            Some(NodeView::Text(text)) => text.chars().count(),
            Some(NodeView::Element { .. }) => self.children(id).len(),
            None => 0,
        }
    }

    fn is_valid_boundary(&self, boundary: Boundary) -> bool {
        self.is_connected(boundary.node) && boundary.offset <= self.node_length(boundary.node)
    }

    /// Build a range from two boundaries. Returns `None` if either boundary
    /// is invalid. An end before the start collapses the range onto the end.
    fn create_range(&self, start: Boundary, end: Boundary) -> Option<ViewRange> {
        if !self.is_valid_boundary(start) || !self.is_valid_boundary(end) {
            return None;
        }
        if compare_points(self, start, end) == Ordering::Greater {
            return Some(ViewRange::collapsed(end));
        }
        Some(ViewRange::new(start, end))
    }

    /// Inclusive ancestor test.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}
