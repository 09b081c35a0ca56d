//! Native formatting commands for the in-memory view.

use super::range::{Boundary, ViewRange};
use super::surface::ViewSurface;
use super::tree::{Element, NodeId, ViewTree};
use super::ViewError;
use crate::document::{BlockStyle, FormattingCommand, InlineStyle};

/// A surface that can apply formatting commands itself.
pub trait NativeFormatter {
    /// Apply `command` to `range`.
    ///
    /// Returns `Ok(false)` when the command had nothing to act on.
    ///
    /// # Errors
    /// [`ViewError::Unsupported`] when the surface has native commands
    /// switched off, [`ViewError::InvalidRange`] when the range is stale.
    fn exec_native(&mut self, command: &FormattingCommand, range: &ViewRange)
    -> Result<bool, ViewError>;
}

impl NativeFormatter for ViewTree {
    fn exec_native(
        &mut self,
        command: &FormattingCommand,
        range: &ViewRange,
    ) -> Result<bool, ViewError> {
        if !self.native_commands_enabled() {
            return Err(ViewError::Unsupported(command.label()));
        }
        if !self.is_valid_boundary(range.start) || !self.is_valid_boundary(range.end) {
            return Err(ViewError::InvalidRange);
        }
        let applied = match command {
            FormattingCommand::Inline(style) => self.toggle_inline(*style, range)?,
            FormattingCommand::Block(style) => self.format_block(*style, range),
            FormattingCommand::InsertLink { href } => self.insert_link(href, range)?,
        };
        if applied {
            self.normalize();
        }
        Ok(applied)
    }
}

impl ViewTree {
    fn toggle_inline(&mut self, style: InlineStyle, range: &ViewRange) -> Result<bool, ViewError> {
        if range.is_collapsed() {
            return Ok(false);
        }
        let root = self.root();
        let mut current = self.common_ancestor(range.start.node, range.end.node);
        while let Some(id) = current {
            if id == root {
                break;
            }
            if self
                .tag(id)
                .is_some_and(|tag| style.matching_tags().contains(&tag))
            {
                self.unstyle_range(id, range)?;
                return Ok(true);
            }
            current = self.parent(id);
        }
        self.surround_contents(range, Element::new(style.tag()))?;
        Ok(true)
    }

    /// Remove `styled` from the selected part only. The selection is lifted
    /// out of every element up to and including `styled`, splitting each so
    /// the unselected parts keep their formatting.
    fn unstyle_range(&mut self, styled: NodeId, range: &ViewRange) -> Result<(), ViewError> {
        let marker = self.surround_contents(range, Element::new("span"))?;
        let mut lifted = marker;
        while let Some(parent) = self.parent(lifted) {
            let Some(piece) = self.isolate(lifted) else {
                break;
            };
            if parent == styled {
                self.unwrap_element(piece);
                break;
            }
            lifted = piece;
        }
        self.unwrap_element(marker);
        Ok(())
    }

    /// Split the parent of `node` around it. Returns the parent's clone that
    /// now holds `node` alone.
    fn isolate(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        let piece = self.split_element(parent, index)?;
        if self.children(piece).len() > 1 {
            self.split_element(piece, 1);
        }
        Some(piece)
    }

    /// Top-level block holding `boundary`.
    fn top_level_block(&self, boundary: Boundary) -> Option<NodeId> {
        let root = self.root();
        if boundary.node == root {
            let children = self.children(root);
            let index = boundary.offset.min(children.len().checked_sub(1)?);
            return children.get(index).copied();
        }
        let mut current = boundary.node;
        while let Some(parent) = self.parent(current) {
            if parent == root {
                return Some(current);
            }
            current = parent;
        }
        None
    }

    fn format_block(&mut self, style: BlockStyle, range: &ViewRange) -> bool {
        let Some(block) = self.top_level_block(range.start) else {
            return false;
        };
        let current = self.tag(block).map(str::to_string);
        let current = current.as_deref();

        match style {
            BlockStyle::BulletList | BlockStyle::OrderedList => {
                let target = style.tag();
                match current {
                    Some(tag) if tag == target => self.list_to_paragraphs(block),
                    Some("ul" | "ol") => self.rename(block, &target),
                    _ => {
                        let list = self.create_element(Element::new(&target));
                        let item = self.create_element(Element::new("li"));
                        self.append_child(list, item);
                        self.move_content(block, item);
                        self.replace(block, list);
                    }
                }
            }
            BlockStyle::CodeBlock => {
                if current == Some("pre") {
                    let text = self.text_content(block);
                    let paragraph = self.create_element(Element::new("p"));
                    let node = self.create_text(text);
                    self.append_child(paragraph, node);
                    self.replace(block, paragraph);
                } else {
                    let text = self.text_content(block);
                    let pre = self.create_element(Element::new("pre"));
                    let code = self.create_element(Element::new("code"));
                    let node = self.create_text(text);
                    self.append_child(code, node);
                    self.append_child(pre, code);
                    self.replace(block, pre);
                }
            }
            BlockStyle::Heading(_) | BlockStyle::Quote | BlockStyle::Paragraph => {
                let target = style.tag();
                match current {
                    Some("ul" | "ol") => {
                        let element = self.create_element(Element::new(&target));
                        for (index, item) in self.children(block).to_vec().into_iter().enumerate() {
                            if index > 0 {
                                let br = self.create_element(Element::new("br"));
                                self.append_child(element, br);
                            }
                            self.move_content(item, element);
                        }
                        self.replace(block, element);
                    }
                    Some("pre") => {
                        let text = self.text_content(block);
                        let element = self.create_element(Element::new(&target));
                        let node = self.create_text(text);
                        self.append_child(element, node);
                        self.replace(block, element);
                    }
                    Some(_) => self.rename(block, &target),
                    None => {
                        let element = self.create_element(Element::new(&target));
                        self.replace(block, element);
                        self.append_child(element, block);
                    }
                }
            }
        }
        true
    }

    /// Move the children of `from` into `to`; a text node moves itself.
    fn move_content(&mut self, from: NodeId, to: NodeId) {
        if self.is_text(from) {
            self.append_child(to, from);
            return;
        }
        for child in self.children(from).to_vec() {
            self.append_child(to, child);
        }
    }

    fn list_to_paragraphs(&mut self, list: NodeId) {
        let root = self.root();
        let Some(mut index) = self.index_in_parent(list) else {
            return;
        };
        for item in self.children(list).to_vec() {
            let paragraph = self.create_element(Element::new("p"));
            self.move_content(item, paragraph);
            self.insert_child(root, index + 1, paragraph);
            index += 1;
        }
        self.detach(list);
    }

    fn insert_link(&mut self, href: &str, range: &ViewRange) -> Result<bool, ViewError> {
        let link = Element::new("a")
            .with_attr("href", href)
            .with_attr("rel", "noopener noreferrer")
            .with_attr("target", "_blank");
        if !range.is_collapsed() {
            self.surround_contents(range, link)?;
            return Ok(true);
        }

        let anchor = self.create_element(link);
        let label = self.create_text(href);
        self.append_child(anchor, label);
        let at = range.start;
        if self.is_text(at.node) {
            let len = self.node_length(at.node);
            if at.offset == 0 {
                let (Some(parent), Some(index)) = (self.parent(at.node), self.index_in_parent(at.node))
                else {
                    return Err(ViewError::InvalidRange);
                };
                self.insert_child(parent, index, anchor);
            } else {
                if at.offset < len {
                    self.split_text(at.node, at.offset);
                }
                self.insert_after(at.node, anchor);
            }
        } else {
            self.insert_child(at.node, at.offset, anchor);
        }
        Ok(true)
    }
}
