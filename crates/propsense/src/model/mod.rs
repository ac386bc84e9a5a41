//! Offset-addressed semantic tree.
//!
//! A [`Model`] is built in one pass from the parser's event stream and never
//! changes afterwards. Nodes live in a flat arena owned by the model and refer
//! to each other by [`NodeId`]; parent links are plain indices, so the whole
//! tree is freed as a unit. Nodes store spans only. Text is resolved from the
//! model's [`TextBuffer`] on demand.
//!
//! [`Node`] is a cheap `Copy` handle pairing a model with an id. The typed
//! views in [`property`] wrap a handle whose kind has been checked.

mod builder;
mod property;

#[cfg(test)]
mod tests;

use std::{borrow::Cow, collections::HashSet, sync::OnceLock};

use builder::ModelBuilder;
pub use property::{Property, PropertyKey, PropertyValue, PropertyValueExpression};

use crate::{
    cancel::{CancelChecker, Cancelled},
    parser::{ParseError, parse},
    text::{BadLocation, Position, Range, Span, TextBuffer},
};

/// Index of a node in its model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The document root.
    pub const ROOT: Self = Self(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
pub enum NodeKind {
    Document,
    Property,
    PropertyKey,
    /// The one character `=` or `:` delimiter.
    Assign,
    PropertyValue,
    PropertyValueLiteral,
    PropertyValueExpression,
    Comment,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    /// `None` while the node has not been closed by the parser.
    start: Option<usize>,
    end: Option<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The parsed form of one document version.
#[derive(Debug)]
pub struct Model {
    buffer: TextBuffer,
    nodes: Vec<NodeData>,
    errors: Vec<ParseError>,
    keys: OnceLock<HashSet<String>>,
}

impl Model {
    /// Parses `text` as version 0 of `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fired before the parse completed.
    ///
    /// ```rust
    /// use propsense::{Model, NeverCancel};
    ///
    /// let model = Model::parse("file:///application.properties", "%dev.a.\\\n  b = 1", &NeverCancel).unwrap();
    /// let property = model.properties().next().unwrap();
    /// assert_eq!(property.profile().as_deref(), Some("dev"));
    /// assert_eq!(property.property_name(), "a.b");
    /// assert_eq!(property.property_value().as_deref(), Some("1"));
    /// ```
    pub fn parse<C: CancelChecker + ?Sized>(
        uri: &str,
        text: &str,
        cancel: &C,
    ) -> Result<Self, Cancelled> {
        Self::from_buffer(TextBuffer::new(uri, text, 0), cancel)
    }

    /// Parses the current text of `buffer`. The model keeps the buffer as its
    /// text snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fired before the parse completed.
    pub fn from_buffer<C: CancelChecker + ?Sized>(
        buffer: TextBuffer,
        cancel: &C,
    ) -> Result<Self, Cancelled> {
        let mut builder = ModelBuilder::default();
        parse(buffer.text(), &mut builder, cancel)?;
        Ok(builder.finish(buffer))
    }

    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        self.buffer.uri()
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.buffer.version()
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        self.buffer.text()
    }

    /// Problems reported while scanning, in document order.
    #[must_use]
    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    #[must_use]
    pub fn document(&self) -> Node<'_> {
        Node { model: self, id: NodeId::ROOT }
    }

    /// The node behind `id`, if it belongs to this model.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { model: self, id })
    }

    /// Top-level properties in document order.
    pub fn properties(&self) -> impl Iterator<Item = Property<'_>> {
        self.document().children().filter_map(Node::as_property)
    }

    /// The deepest node at `offset`; see [`Node::find_node_at`].
    #[must_use]
    pub fn find_node_at(&self, offset: usize) -> Node<'_> {
        self.document().find_node_at(offset)
    }

    /// Names, profile prefix included, of every property whose value has
    /// non-blank text. Computed on first use.
    pub fn keys(&self) -> &HashSet<String> {
        self.keys.get_or_init(|| {
            self.properties()
                .filter(|property| {
                    property.property_value().is_some_and(|value| !value.trim().is_empty())
                })
                .filter_map(|property| property.property_name_with_profile().map(Cow::into_owned))
                .collect()
        })
    }

    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.keys().contains(name)
    }

    /// The value of the first property named `key`, profile prefix
    /// included, whose value text is not blank. Continuations are removed.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Cow<'_, str>> {
        self.properties()
            .filter(|property| property.property_name_with_profile().as_deref() == Some(key))
            .filter_map(Property::property_value)
            .find(|value| !value.trim().is_empty())
    }

    /// Text between two character offsets, or `None` if the span is not in
    /// the document.
    ///
    /// With `skip_multiline`, every continuation (a backslash right before a
    /// line terminator) is removed together with the terminator and the
    /// leading whitespace of the following line. Other backslashes are kept
    /// as they are.
    #[must_use]
    pub fn text(&self, start: usize, end: usize, skip_multiline: bool) -> Option<Cow<'_, str>> {
        let raw = self.buffer.slice(start, end)?;
        if !skip_multiline || !raw.contains('\\') {
            return Some(Cow::Borrowed(raw));
        }

        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        let mut trim_leading = false;
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.peek() {
                    Some('\n') => {
                        chars.next();
                        trim_leading = true;
                        continue;
                    }
                    Some('\r') => {
                        chars.next();
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                        trim_leading = true;
                        continue;
                    }
                    _ => {}
                }
            }
            if trim_leading && ch.is_whitespace() {
                continue;
            }
            trim_leading = false;
            out.push(ch);
        }
        Some(Cow::Owned(out))
    }

    /// Converts a position into a character offset.
    ///
    /// # Errors
    ///
    /// Fails if `position` is outside the document.
    pub fn offset_at(&self, position: Position) -> Result<usize, BadLocation> {
        self.buffer.offset_at(position)
    }

    /// Converts a character offset into a position.
    ///
    /// # Errors
    ///
    /// Fails if `offset` is past the end of the document.
    pub fn position_at(&self, offset: usize) -> Result<Position, BadLocation> {
        self.buffer.position_at(offset)
    }

    /// Converts a span into a range.
    ///
    /// # Errors
    ///
    /// Fails if either end of the span is past the end of the document.
    pub fn range_of(&self, span: Span) -> Result<Range, BadLocation> {
        self.buffer.range_of(span)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Checks the structural invariants of the tree.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn check_invariants(&self) -> Result<(), String> {
        let len = self.buffer.len_chars();
        for (index, node) in self.nodes.iter().enumerate() {
            let (Some(start), Some(end)) = (node.start, node.end) else {
                return Err(format!("node {index} ({:?}) was never closed", node.kind));
            };
            if start > end || end > len {
                return Err(format!("node {index} has span {start}..{end} in a text of {len}"));
            }
            let mut previous_end = start;
            for child in &node.children {
                let data = self.data(*child);
                if data.parent != Some(NodeId(index)) {
                    return Err(format!("node {} does not point back to {index}", child.0));
                }
                let (Some(child_start), Some(child_end)) = (data.start, data.end) else {
                    continue;
                };
                if child_start < previous_end || child_end > end {
                    return Err(format!("node {} overlaps its siblings or parent", child.0));
                }
                previous_end = child_end;
            }
            if node.kind == NodeKind::Property {
                let kinds: Vec<_> = node.children.iter().map(|c| self.data(*c).kind).collect();
                let valid = matches!(
                    kinds.as_slice(),
                    [NodeKind::PropertyKey]
                        | [NodeKind::PropertyKey, NodeKind::Assign]
                        | [NodeKind::PropertyKey, NodeKind::Assign, NodeKind::PropertyValue]
                );
                if !valid {
                    return Err(format!("property {index} has children {kinds:?}"));
                }
            }
        }
        Ok(())
    }
}

/// A handle to one node of a [`Model`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'m> {
    model: &'m Model,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'m> Node<'m> {
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn model(self) -> &'m Model {
        self.model
    }

    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.data().kind
    }

    /// Offset of the first character, `None` if the node was never opened
    /// properly.
    #[must_use]
    pub fn start(self) -> Option<usize> {
        self.data().start
    }

    /// Offset one past the last character, `None` if the node was never
    /// closed.
    #[must_use]
    pub fn end(self) -> Option<usize> {
        self.data().end
    }

    /// The node's span, if both ends are known.
    #[must_use]
    pub fn span(self) -> Option<Span> {
        Some(Span::new(self.start()?, self.end()?))
    }

    #[must_use]
    pub fn parent(self) -> Option<Node<'m>> {
        self.data().parent.map(|id| self.with_id(id))
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = Node<'m>> + ExactSizeIterator {
        self.model.data(self.id).children.iter().map(move |id| self.with_id(*id))
    }

    /// The node's text, see [`Model::text`]. `None` for an unclosed node.
    #[must_use]
    pub fn text(self, skip_multiline: bool) -> Option<Cow<'m, str>> {
        let span = self.span()?;
        self.model.text(span.start, span.end, skip_multiline)
    }

    /// Descends to the deepest node whose span touches `offset`, both ends
    /// inclusive. A property resolves boundary ties in favour of its key,
    /// then its delimiter, then its value.
    #[must_use]
    pub fn find_node_at(self, offset: usize) -> Node<'m> {
        match self.kind() {
            NodeKind::Property => Property(self).find_node_at(offset),
            NodeKind::Document | NodeKind::PropertyValue => self
                .children()
                .find(|child| child.span().is_some_and(|span| span.touches(offset)))
                .map_or(self, |child| child.find_node_at(offset)),
            _ => self,
        }
    }

    #[must_use]
    pub fn as_property(self) -> Option<Property<'m>> {
        (self.kind() == NodeKind::Property).then_some(Property(self))
    }

    #[must_use]
    pub fn as_key(self) -> Option<PropertyKey<'m>> {
        (self.kind() == NodeKind::PropertyKey).then_some(PropertyKey(self))
    }

    #[must_use]
    pub fn as_value(self) -> Option<PropertyValue<'m>> {
        (self.kind() == NodeKind::PropertyValue).then_some(PropertyValue(self))
    }

    #[must_use]
    pub fn as_expression(self) -> Option<PropertyValueExpression<'m>> {
        (self.kind() == NodeKind::PropertyValueExpression).then_some(PropertyValueExpression(self))
    }

    fn data(self) -> &'m NodeData {
        self.model.data(self.id)
    }

    fn with_id(self, id: NodeId) -> Node<'m> {
        Node { model: self.model, id }
    }

    fn child_of_kind(self, kind: NodeKind) -> Option<Node<'m>> {
        self.children().find(|child| child.kind() == kind)
    }
}
