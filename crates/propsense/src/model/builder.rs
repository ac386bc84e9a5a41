//! Event handler that assembles the node arena.

use std::sync::OnceLock;

use super::{Model, NodeData, NodeId, NodeKind};
use crate::{
    parser::{ParseError, PropertiesHandler},
    text::TextBuffer,
};

/// Builds the arena from balanced start/end events. The stack holds the
/// chain of nodes still open; an `end_*` event closes the innermost one if
/// its kind matches.
#[derive(Debug, Default)]
pub(super) struct ModelBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
    errors: Vec<ParseError>,
}

impl ModelBuilder {
    fn push(&mut self, kind: NodeKind, start: usize, end: Option<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.open.last().copied();
        self.nodes.push(NodeData { kind, start: Some(start), end, parent, children: Vec::new() });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn open(&mut self, kind: NodeKind, offset: usize) {
        let id = self.push(kind, offset, None);
        self.open.push(id);
    }

    fn close(&mut self, kind: NodeKind, offset: usize) {
        let Some(&id) = self.open.last() else {
            return;
        };
        let node = &mut self.nodes[id.0];
        debug_assert_eq!(node.kind, kind, "unbalanced event stream");
        if node.kind == kind {
            node.end = Some(offset);
            self.open.pop();
        }
    }

    pub(super) fn finish(mut self, buffer: TextBuffer) -> Model {
        if self.nodes.is_empty() {
            self.push(NodeKind::Document, 0, Some(buffer.len_chars()));
        }
        Model { buffer, nodes: self.nodes, errors: self.errors, keys: OnceLock::new() }
    }
}

impl PropertiesHandler for ModelBuilder {
    fn start_document(&mut self, offset: usize) {
        self.open(NodeKind::Document, offset);
    }

    fn end_document(&mut self, offset: usize) {
        self.close(NodeKind::Document, offset);
    }

    fn start_property(&mut self, offset: usize) {
        self.open(NodeKind::Property, offset);
    }

    fn end_property(&mut self, offset: usize) {
        self.close(NodeKind::Property, offset);
    }

    fn start_property_name(&mut self, offset: usize) {
        self.open(NodeKind::PropertyKey, offset);
    }

    fn end_property_name(&mut self, offset: usize) {
        self.close(NodeKind::PropertyKey, offset);
    }

    fn delimiter_assign(&mut self, offset: usize) {
        self.push(NodeKind::Assign, offset, Some(offset + 1));
    }

    fn start_property_value(&mut self, offset: usize) {
        self.open(NodeKind::PropertyValue, offset);
    }

    fn end_property_value(&mut self, offset: usize) {
        self.close(NodeKind::PropertyValue, offset);
    }

    fn start_property_value_literal(&mut self, offset: usize) {
        self.open(NodeKind::PropertyValueLiteral, offset);
    }

    fn end_property_value_literal(&mut self, offset: usize) {
        self.close(NodeKind::PropertyValueLiteral, offset);
    }

    fn start_property_value_expression(&mut self, offset: usize) {
        self.open(NodeKind::PropertyValueExpression, offset);
    }

    fn end_property_value_expression(&mut self, offset: usize) {
        self.close(NodeKind::PropertyValueExpression, offset);
    }

    fn start_comment(&mut self, offset: usize) {
        self.open(NodeKind::Comment, offset);
    }

    fn end_comment(&mut self, offset: usize) {
        self.close(NodeKind::Comment, offset);
    }

    fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }
}

#[cfg(test)]
pub(super) mod test_support {
    //! Drives the builder by hand to produce trees a complete parse never
    //! would, such as nodes left open by a truncated stream.

    use super::*;

    pub(in crate::model) fn truncated(text: &str, drive: impl FnOnce(&mut dyn PropertiesHandler)) -> Model {
        let mut builder = ModelBuilder::default();
        drive(&mut builder);
        builder.finish(TextBuffer::new("file:///truncated.properties", text, 0))
    }
}
