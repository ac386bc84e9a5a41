use std::borrow::Cow;

use super::{Node, NodeKind};

/// A `key = value` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'m>(pub(super) Node<'m>);

/// The key of a [`Property`], profile prefix included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyKey<'m>(pub(super) Node<'m>);

/// The value of a [`Property`]: literal and expression fragments in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyValue<'m>(pub(super) Node<'m>);

/// A `${...}` fragment of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyValueExpression<'m>(pub(super) Node<'m>);

macro_rules! impl_node_view {
    ($($view:ident),*) => {$(
        impl<'m> $view<'m> {
            /// The underlying node handle.
            #[must_use]
            pub fn node(self) -> Node<'m> {
                self.0
            }
        }
    )*};
}

impl_node_view!(Property, PropertyKey, PropertyValue, PropertyValueExpression);

impl<'m> Property<'m> {
    #[must_use]
    pub fn key(self) -> Option<PropertyKey<'m>> {
        self.0.child_of_kind(NodeKind::PropertyKey).map(PropertyKey)
    }

    #[must_use]
    pub fn assign(self) -> Option<Node<'m>> {
        self.0.child_of_kind(NodeKind::Assign)
    }

    #[must_use]
    pub fn value(self) -> Option<PropertyValue<'m>> {
        self.0.child_of_kind(NodeKind::PropertyValue).map(PropertyValue)
    }

    #[must_use]
    pub fn profile(self) -> Option<&'m str> {
        self.key()?.profile()
    }

    /// The logical name without profile; empty when there is none.
    #[must_use]
    pub fn property_name(self) -> Cow<'m, str> {
        self.key().and_then(PropertyKey::property_name).unwrap_or(Cow::Borrowed(""))
    }

    #[must_use]
    pub fn property_name_with_profile(self) -> Option<Cow<'m, str>> {
        self.key()?.property_name_with_profile()
    }

    /// The logical value text, continuations removed.
    #[must_use]
    pub fn property_value(self) -> Option<Cow<'m, str>> {
        self.value()?.value()
    }

    /// `true` if the value contains at least one expression.
    #[must_use]
    pub fn is_value_expression(self) -> bool {
        self.value().is_some_and(|value| value.expressions().next().is_some())
    }

    pub(super) fn find_node_at(self, offset: usize) -> Node<'m> {
        let Some(key) = self.key() else {
            return self.0;
        };
        match key.0.end() {
            None => return key.0,
            Some(end) if offset <= end => return key.0,
            Some(_) => {}
        }
        let Some(assign) = self.assign() else {
            return key.0;
        };
        match self.value() {
            Some(value) if value.0.start().is_some_and(|start| offset >= start) => {
                value.0.find_node_at(offset)
            }
            _ => assign,
        }
    }
}

impl<'m> PropertyKey<'m> {
    #[must_use]
    pub fn property(self) -> Option<Property<'m>> {
        self.0.parent().and_then(Node::as_property)
    }

    /// The `<profile>` of a `%<profile>.name` key.
    #[must_use]
    pub fn profile(self) -> Option<&'m str> {
        let start = self.0.start()?;
        let profile_end = self.end_profile_offset()?;
        self.0.model.buffer.slice(start + 1, profile_end)
    }

    /// The logical name after the profile, continuations removed. `None` for
    /// a bare `%profile` key.
    #[must_use]
    pub fn property_name(self) -> Option<Cow<'m, str>> {
        match self.end_profile_offset() {
            Some(profile_end) => {
                let end = self.0.end()?;
                if profile_end < end {
                    self.0.model.text(profile_end + 1, end, true)
                } else {
                    None
                }
            }
            None => self.0.text(true),
        }
    }

    #[must_use]
    pub fn property_name_with_profile(self) -> Option<Cow<'m, str>> {
        self.0.text(true)
    }

    /// `true` if `offset` lies inside the `%profile` prefix, the dot
    /// included.
    #[must_use]
    pub fn is_before_profile(self, offset: usize) -> bool {
        self.end_profile_offset().is_some_and(|profile_end| offset <= profile_end)
    }

    /// Offset of the dot ending the profile prefix, or the key end if there
    /// is no dot. Found by scanning forward from a leading `%`.
    fn end_profile_offset(self) -> Option<usize> {
        let (start, end) = (self.0.start()?, self.0.end()?);
        let buffer = &self.0.model.buffer;
        if buffer.char_at(start)? != '%' {
            return None;
        }
        Some((start..end).find(|&i| buffer.char_at(i) == Some('.')).unwrap_or(end))
    }
}

impl<'m> PropertyValue<'m> {
    #[must_use]
    pub fn property(self) -> Option<Property<'m>> {
        self.0.parent().and_then(Node::as_property)
    }

    /// The logical value text, continuations removed.
    #[must_use]
    pub fn value(self) -> Option<Cow<'m, str>> {
        self.0.text(true)
    }

    /// Literal and expression fragments in order.
    pub fn fragments(self) -> impl DoubleEndedIterator<Item = Node<'m>> + ExactSizeIterator {
        self.0.children()
    }

    pub fn expressions(self) -> impl Iterator<Item = PropertyValueExpression<'m>> {
        self.0.children().filter_map(Node::as_expression)
    }
}

impl<'m> PropertyValueExpression<'m> {
    /// `true` if the expression reads `${...}` with its closing brace.
    #[must_use]
    pub fn is_closed(self) -> bool {
        self.0
            .text(true)
            .is_some_and(|text| text.len() >= 3 && text.starts_with("${") && text.ends_with('}'))
    }

    /// The referenced property name: the text after `${` up to the first `:`
    /// or the closing brace. `None` for a bare `$`.
    #[must_use]
    pub fn reference_name(self) -> Option<Cow<'m, str>> {
        let text = self.0.text(true)?;
        let inner = inner_range(&text)?;
        let name_end = text[inner.clone()].find(':').map_or(inner.end, |i| inner.start + i);
        Some(sub_cow(text, inner.start..name_end))
    }

    /// The fallback after the first `:`, if any.
    #[must_use]
    pub fn default_value(self) -> Option<Cow<'m, str>> {
        let text = self.0.text(true)?;
        let inner = inner_range(&text)?;
        let colon = text[inner.clone()].find(':')?;
        Some(sub_cow(text, inner.start + colon + 1..inner.end))
    }
}

/// Byte range between `${` and the closing brace, or the end of the text if
/// the brace is missing.
fn inner_range(text: &str) -> Option<std::ops::Range<usize>> {
    if !text.starts_with("${") {
        return None;
    }
    let end = if text.len() > 2 && text.ends_with('}') { text.len() - 1 } else { text.len() };
    Some(2..end)
}

fn sub_cow(text: Cow<'_, str>, range: std::ops::Range<usize>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(text) => Cow::Borrowed(&text[range]),
        Cow::Owned(text) => Cow::Owned(text[range].to_owned()),
    }
}
