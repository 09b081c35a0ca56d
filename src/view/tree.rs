//! Arena-backed view tree.

use slotmap::{SlotMap, new_key_type};

use super::range::{Boundary, ViewRange};
use super::surface::{NodeView, ViewSurface};
use super::{INLINE_TAGS, ViewError, html, is_void};

new_key_type! {
    /// Handle to a node in a [`ViewTree`].
    ///
    /// Replacing the tree content clears the arena, so handles from the
    /// previous content stop resolving and read as disconnected.
    pub struct NodeId;
}

/// An element: lowercase tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Payload of a view node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn root() -> Self {
        Self {
            kind: NodeKind::Element(Element::new("div")),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The formatted view of a document.
///
/// Nodes removed from the tree stay in the arena (detached) until the next
/// `set_inner_html`.
#[derive(Debug, Clone)]
pub struct ViewTree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    native_commands: bool,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// Create an empty view.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::root());
        Self {
            nodes,
            root,
            native_commands: true,
        }
    }

    /// Create a view from an HTML fragment.
    pub fn from_html(html: &str) -> Self {
        let mut tree = Self::new();
        tree.set_inner_html(html);
        tree
    }

    /// Replace the whole content of the view.
    ///
    /// Every previously issued [`NodeId`] becomes stale.
    pub fn set_inner_html(&mut self, markup: &str) {
        self.nodes.clear();
        let root = self.nodes.insert(NodeData::root());
        self.root = root;
        html::parse_into(self, root, markup);
    }

    /// Serialize the content of the view as an HTML fragment.
    pub fn inner_html(&self) -> String {
        html::write_children(self, self.root)
    }

    /// Whether `exec_native` is available on this view.
    pub const fn native_commands_enabled(&self) -> bool {
        self.native_commands
    }

    /// Enable or disable native formatting commands.
    pub const fn set_native_commands(&mut self, enabled: bool) {
        self.native_commands = enabled;
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    // --- Queries ---

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|d| &d.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|d| d.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |d| d.children.as_slice())
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// True when the node belongs to the current content and is reachable
    /// from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let root = self.root();
        let mut current = id;
        loop {
            if current == root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Inclusive ancestor test.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nodes of the subtree rooted at `id`, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.nodes.get(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// First descendant element (excluding `id`) with the given tag.
    pub fn find_descendant(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .find(|n| self.tag(*n) == Some(tag))
    }

    /// Closest inclusive ancestor of `a` that also contains `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut current = Some(a);
        while let Some(id) = current {
            if self.contains(id, b) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    // --- Mutations ---

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, usize::MAX, child);
    }

    /// Insert `child` into `parent` at `index` (clamped), moving it out of
    /// its previous position first. Inserting a node into its own subtree
    /// or into a text node is ignored.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if self.nodes.get(child).is_none() || self.contains(child, parent) {
            return;
        }
        if !matches!(self.kind(parent), Some(NodeKind::Element(_))) {
            return;
        }
        self.detach(child);
        if let Some(data) = self.nodes.get_mut(parent) {
            let at = index.min(data.children.len());
            data.children.insert(at, child);
        }
        if let Some(data) = self.nodes.get_mut(child) {
            data.parent = Some(parent);
        }
    }

    /// Insert `node` right after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference)) {
            self.insert_child(parent, index + 1, node);
        }
    }

    /// Remove a node from its parent. The node stays valid but detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.retain(|c| *c != id);
        }
        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = None;
        }
    }

    /// Replace `old` with `new` at the same position.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if let (Some(parent), Some(index)) = (self.parent(old), self.index_in_parent(old)) {
            self.detach(old);
            self.insert_child(parent, index, new);
        }
    }

    /// Replace an element with its children.
    pub fn unwrap_element(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return;
        };
        let children = self.children(id).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + offset, child);
        }
        self.detach(id);
    }

    /// Change the tag of an element, keeping its attributes.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element(element),
            ..
        }) = self.nodes.get_mut(id)
        {
            element.tag = tag.to_ascii_lowercase();
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(NodeData {
            kind: NodeKind::Text(current),
            ..
        }) = self.nodes.get_mut(id)
        {
            *current = text.into();
        }
    }

    /// Split a text node at a character offset. The tail becomes a new
    /// sibling inserted right after the node, which is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?.to_string();
        let byte = char_to_byte(&text, offset);
        let (head, tail) = text.split_at(byte);
        let tail = tail.to_string();
        self.set_text(id, head.to_string());
        let tail_node = self.create_text(tail);
        self.insert_after(id, tail_node);
        Some(tail_node)
    }

    /// Split an element at a child index. Children from `index` on move to
    /// a shallow clone inserted after the element; the clone is returned.
    pub(crate) fn split_element(&mut self, id: NodeId, index: usize) -> Option<NodeId> {
        let element = self.element(id)?.clone();
        let moved = self.children(id).get(index..)?.to_vec();
        let clone = self.create_element(element);
        for child in moved {
            self.append_child(clone, child);
        }
        self.insert_after(id, clone);
        Some(clone)
    }

    /// Merge adjacent text nodes, drop empty text nodes and empty inline
    /// containers.
    pub fn normalize(&mut self) {
        let root = self.root();
        self.normalize_node(root);
    }

    fn normalize_node(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            if !self.is_text(child) {
                self.normalize_node(child);
            }
        }

        let mut kept: Vec<NodeId> = Vec::new();
        let mut dropped: Vec<NodeId> = Vec::new();
        for child in self.children(id).to_vec() {
            match self.kind(child) {
                Some(NodeKind::Text(text)) if text.is_empty() => dropped.push(child),
                Some(NodeKind::Text(text)) => {
                    let text = text.clone();
                    match kept.last() {
                        Some(&prev) if self.is_text(prev) => {
                            let merged = format!("{}{text}", self.text(prev).unwrap_or_default());
                            self.set_text(prev, merged);
                            dropped.push(child);
                        }
                        _ => kept.push(child),
                    }
                }
                Some(NodeKind::Element(element))
                    if self.children(child).is_empty()
                        && !is_void(&element.tag)
                        && INLINE_TAGS.contains(&element.tag.as_str()) =>
                {
                    dropped.push(child);
                }
                _ => kept.push(child),
            }
        }

        for node in dropped {
            if let Some(data) = self.nodes.get_mut(node) {
                data.parent = None;
            }
        }
        if let Some(data) = self.nodes.get_mut(id) {
            data.children = kept;
        }
    }

    /// Move the contents of `range` into `element` and insert the element
    /// where the contents were. Partially selected ancestors are split, as
    /// DOM `extractContents` + `insertNode` would do.
    ///
    /// # Errors
    /// Returns [`ViewError::InvalidRange`] if the range is collapsed or an
    /// endpoint is not connected.
    pub fn surround_contents(
        &mut self,
        range: &ViewRange,
        element: Element,
    ) -> Result<NodeId, ViewError> {
        if range.is_collapsed()
            || !self.is_valid_boundary(range.start)
            || !self.is_valid_boundary(range.end)
        {
            return Err(ViewError::InvalidRange);
        }

        // End first: splitting at the start never moves nodes the end
        // anchor refers to.
        let mut end = self.anchor_for(range.end);
        let mut start = self.anchor_for(range.start);

        let start_container = self.anchor_container(start).ok_or(ViewError::InvalidRange)?;
        let end_container = self.anchor_container(end).ok_or(ViewError::InvalidRange)?;
        let ancestor = self
            .common_ancestor(start_container, end_container)
            .ok_or(ViewError::InvalidRange)?;

        while let Some((container, index)) = self.resolve_anchor(start) {
            if container == ancestor {
                break;
            }
            start = self.lift_anchor(container, index);
        }
        while let Some((container, index)) = self.resolve_anchor(end) {
            if container == ancestor {
                break;
            }
            end = self.lift_anchor(container, index);
        }

        let (_, start_index) = self.resolve_anchor(start).ok_or(ViewError::InvalidRange)?;
        let (_, end_index) = self.resolve_anchor(end).ok_or(ViewError::InvalidRange)?;
        let end_index = end_index.max(start_index);

        let moved = self.children(ancestor)[start_index..end_index].to_vec();
        let wrapper = self.create_element(element);
        for child in moved {
            self.append_child(wrapper, child);
        }
        self.insert_child(ancestor, start_index, wrapper);
        Ok(wrapper)
    }

    fn anchor_for(&mut self, boundary: Boundary) -> Anchor {
        if let Some(text) = self.text(boundary.node) {
            let len = text.chars().count();
            if boundary.offset == 0 {
                return Anchor::Before(boundary.node);
            }
            if boundary.offset >= len {
                return self.after(boundary.node);
            }
            return self
                .split_text(boundary.node, boundary.offset)
                .map_or(Anchor::Before(boundary.node), Anchor::Before);
        }
        self.children(boundary.node)
            .get(boundary.offset)
            .map_or(Anchor::EndOf(boundary.node), |child| Anchor::Before(*child))
    }

    fn after(&self, node: NodeId) -> Anchor {
        let Some(parent) = self.parent(node) else {
            return Anchor::EndOf(node);
        };
        let index = self.index_in_parent(node).unwrap_or_default();
        self.children(parent)
            .get(index + 1)
            .map_or(Anchor::EndOf(parent), |next| Anchor::Before(*next))
    }

    fn anchor_container(&self, anchor: Anchor) -> Option<NodeId> {
        match anchor {
            Anchor::Before(node) => self.parent(node),
            Anchor::EndOf(node) => Some(node),
        }
    }

    fn resolve_anchor(&self, anchor: Anchor) -> Option<(NodeId, usize)> {
        match anchor {
            Anchor::Before(node) => Some((self.parent(node)?, self.index_in_parent(node)?)),
            Anchor::EndOf(node) => Some((node, self.children(node).len())),
        }
    }

    /// Re-express a position inside `container` as a position in its parent.
    fn lift_anchor(&mut self, container: NodeId, index: usize) -> Anchor {
        if index == 0 {
            return Anchor::Before(container);
        }
        if index >= self.children(container).len() {
            return self.after(container);
        }
        self.split_element(container, index)
            .map_or(Anchor::Before(container), Anchor::Before)
    }
}

/// A position that survives sibling insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Before(NodeId),
    EndOf(NodeId),
}

pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

impl ViewSurface for ViewTree {
    fn root(&self) -> NodeId {
        Self::root(self)
    }

    fn node(&self, id: NodeId) -> Option<NodeView<'_>> {
        Some(match self.kind(id)? {
            NodeKind::Text(text) => NodeView::Text(text),
            NodeKind::Element(element) => NodeView::Element {
                tag: &element.tag,
                attrs: &element.attrs,
            },
        })
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        Self::parent(self, id)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        Self::children(self, id)
    }

    fn is_connected(&self, id: NodeId) -> bool {
        Self::is_connected(self, id)
    }
}
