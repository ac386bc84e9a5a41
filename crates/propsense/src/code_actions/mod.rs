//! Fixes for validation diagnostics.
//!
//! Actions are computed from the same [`Model`] and [`MetadataCatalog`] the
//! diagnostics came from. Edits carry both a character [`Span`] and the
//! matching [`Range`]; nothing is applied here.

mod similar;


use tracing::warn;

use crate::{
    cancel::{CancelChecker, Cancelled},
    metadata::MetadataCatalog,
    model::{Model, Node, PropertyValue},
    text::{Range, Span},
    validation::{Diagnostic, ValidationCode},
};

/// Identifies the kind of fix, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
pub enum CodeActionId {
    UnknownPropertySimilarTextSuggestion,
    UnknownEnumValueSimilarTextSuggestion,
    UnknownEnumValueAllEnumsSuggestion,
    AddAllMissingRequiredProperties,
    IgnoreUnknownProperty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "camelCase"))]
pub struct TextEdit {
    pub range: Range,
    pub span: Span,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "camelCase"))]
pub enum Fix {
    /// Edits to the document, in document order.
    Edits(Vec<TextEdit>),
    /// Adds `pattern` to the host's exclusion list of the `unknown` rule.
    ExcludeUnknown { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "camelCase"))]
pub struct CodeAction {
    pub title: String,
    pub id: CodeActionId,
    /// The diagnostics this action resolves.
    pub diagnostics: Vec<Diagnostic>,
    pub fix: Fix,
}

/// Code action configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct CodeActionSettings {
    /// Insert `name = ` rather than `name=`.
    ///
    /// Default: `true`
    pub surround_equals_with_spaces: bool,
    /// Ancestors never offered as an exclusion glob.
    ///
    /// Default: `["quarkus"]`
    pub reserved_roots: Vec<String>,
}

impl Default for CodeActionSettings {
    fn default() -> Self {
        Self { surround_equals_with_spaces: true, reserved_roots: vec!["quarkus".to_owned()] }
    }
}

/// Actions for every diagnostic in `diagnostics`.
///
/// All `required` diagnostics share one bulk insertion, which comes first.
/// The other diagnostics follow in order.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` fired.
///
/// ```rust
/// use propsense::{
///     CodeActionSettings, Fix, ItemMetadata, MetadataCatalog, Model, NeverCancel, ValidationSettings,
///     code_actions_for, validate,
/// };
///
/// let catalog = MetadataCatalog::new(
///     vec![ItemMetadata::new("a.b").required(), ItemMetadata::new("c.d").required()],
///     vec![],
/// );
/// let model = Model::parse("file:///application.properties", "", &NeverCancel).unwrap();
/// let diagnostics = validate(&model, &catalog, &ValidationSettings::default(), &NeverCancel).unwrap();
/// let actions =
///     code_actions_for(&diagnostics, &model, &catalog, &CodeActionSettings::default(), &NeverCancel)
///         .unwrap();
/// let Fix::Edits(edits) = &actions[0].fix else { panic!("expected edits") };
/// assert_eq!(edits[0].new_text, "a.b = \nc.d = ");
/// assert_eq!(edits[0].span.start, 0);
/// ```
pub fn code_actions_for<C: CancelChecker + ?Sized>(
    diagnostics: &[Diagnostic],
    model: &Model,
    catalog: &MetadataCatalog,
    settings: &CodeActionSettings,
    cancel: &C,
) -> Result<Vec<CodeAction>, Cancelled> {
    cancel.check_cancelled()?;
    let engine = Engine { model, catalog, settings, cancel };
    let mut actions = Vec::new();
    let required: Vec<_> =
        diagnostics.iter().filter(|d| d.code == ValidationCode::Required).cloned().collect();
    if !required.is_empty() {
        actions.extend(engine.add_all_required(required));
    }
    for diagnostic in diagnostics {
        engine.for_diagnostic(diagnostic, &mut actions)?;
    }
    Ok(actions)
}

/// Actions for a single diagnostic. A `required` diagnostic gets an
/// insertion of its own property.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` fired.
pub fn code_actions_for_diagnostic<C: CancelChecker + ?Sized>(
    diagnostic: &Diagnostic,
    model: &Model,
    catalog: &MetadataCatalog,
    settings: &CodeActionSettings,
    cancel: &C,
) -> Result<Vec<CodeAction>, Cancelled> {
    code_actions_for(std::slice::from_ref(diagnostic), model, catalog, settings, cancel)
}

struct Engine<'a, C: ?Sized> {
    model: &'a Model,
    catalog: &'a MetadataCatalog,
    settings: &'a CodeActionSettings,
    cancel: &'a C,
}

impl<C: CancelChecker + ?Sized> Engine<'_, C> {
    fn for_diagnostic(
        &self,
        diagnostic: &Diagnostic,
        actions: &mut Vec<CodeAction>,
    ) -> Result<(), Cancelled> {
        self.cancel.check_cancelled()?;
        match diagnostic.code {
            ValidationCode::Unknown => self.unknown_property(diagnostic, actions),
            ValidationCode::Value => self.unknown_enum_value(diagnostic, actions),
            _ => Ok(()),
        }
    }

    fn unknown_property(
        &self,
        diagnostic: &Diagnostic,
        actions: &mut Vec<CodeAction>,
    ) -> Result<(), Cancelled> {
        let Some(key) = self.model.find_node_at(diagnostic.span.start).as_key() else {
            return Ok(());
        };
        let Some(name) = key.property_name() else {
            return Ok(());
        };
        let Some(span) = key.node().span() else {
            return Ok(());
        };

        for metadata in self.catalog.properties() {
            if metadata.is_pattern() || !similar::is_similar(&metadata.name, &name) {
                continue;
            }
            self.cancel.check_cancelled()?;
            let new_text = match key.profile() {
                Some(profile) => format!("%{profile}.{}", metadata.name),
                None => metadata.name.clone(),
            };
            actions.extend(self.replace(
                format!("Did you mean '{}' ?", metadata.name),
                CodeActionId::UnknownPropertySimilarTextSuggestion,
                span,
                new_text,
                diagnostic,
            ));
        }

        self.cancel.check_cancelled()?;
        actions.push(exclude_unknown(name.to_string(), diagnostic));
        let mut parent: &str = &name;
        while let Some((ancestor, _)) = parent.rsplit_once('.') {
            parent = ancestor;
            if self.settings.reserved_roots.iter().any(|root| root == ancestor) {
                continue;
            }
            self.cancel.check_cancelled()?;
            actions.push(exclude_unknown(format!("{ancestor}.*"), diagnostic));
        }
        Ok(())
    }

    fn unknown_enum_value(
        &self,
        diagnostic: &Diagnostic,
        actions: &mut Vec<CodeAction>,
    ) -> Result<(), Cancelled> {
        let node = self.model.find_node_at(diagnostic.span.start);
        let Some(value) = enclosing_value(node) else {
            return Ok(());
        };
        let Some(property) = value.property() else {
            return Ok(());
        };
        let Some(current) = value.value() else {
            return Ok(());
        };
        let current = current.trim();
        let Some(metadata) = self.catalog.get_property(&property.property_name()) else {
            return Ok(());
        };
        let Some(values) = self.catalog.enum_values(metadata).filter(|values| !values.is_empty())
        else {
            return Ok(());
        };
        let converters = &metadata.converter_kinds;

        let mut similar = Vec::new();
        for hint in values {
            if converters.is_empty() {
                if similar::is_similar_value(&hint.value, current) {
                    similar.push(hint.value.clone());
                }
                continue;
            }
            for kind in converters {
                let converted = kind.convert(&hint.value);
                if similar::is_similar_value(&converted, current) {
                    similar.push(converted.into_owned());
                }
            }
        }

        if similar.is_empty() {
            for hint in values {
                self.cancel.check_cancelled()?;
                let preferred = hint.preferred_value(converters);
                actions.extend(self.replace(
                    format!("Replace with '{preferred}'?"),
                    CodeActionId::UnknownEnumValueAllEnumsSuggestion,
                    diagnostic.span,
                    preferred,
                    diagnostic,
                ));
            }
        } else {
            for value in similar {
                self.cancel.check_cancelled()?;
                actions.extend(self.replace(
                    format!("Did you mean '{value}'?"),
                    CodeActionId::UnknownEnumValueSimilarTextSuggestion,
                    diagnostic.span,
                    value,
                    diagnostic,
                ));
            }
        }
        Ok(())
    }

    /// One insertion of `name = ` per diagnostic after the last non-blank
    /// character of the document.
    fn add_all_required(&self, diagnostics: Vec<Diagnostic>) -> Option<CodeAction> {
        let buffer = self.model.buffer();
        let text = buffer.text();
        let offset = text
            .char_indices()
            .rev()
            .find(|(_, ch)| !ch.is_whitespace())
            .map_or(0, |(index, _)| text[..index].chars().count() + 1);
        let delimiter = buffer.line_delimiter(0);
        let assign = if self.settings.surround_equals_with_spaces { " = " } else { "=" };

        let mut new_text = String::new();
        if offset > 0 {
            new_text.push_str(delimiter);
        }
        let names = diagnostics.iter().filter_map(|d| d.property_name.as_deref());
        for (i, name) in names.enumerate() {
            if i > 0 {
                new_text.push_str(delimiter);
            }
            new_text.push_str(name);
            new_text.push_str(assign);
        }

        let span = Span::new(offset, offset);
        let range = match self.model.range_of(span) {
            Ok(range) => range,
            Err(err) => {
                warn!(uri = self.model.uri(), error = %err, "cannot place required properties");
                return None;
            }
        };
        Some(CodeAction {
            title: "Add all missing required properties?".to_owned(),
            id: CodeActionId::AddAllMissingRequiredProperties,
            diagnostics,
            fix: Fix::Edits(vec![TextEdit { range, span, new_text }]),
        })
    }

    fn replace(
        &self,
        title: String,
        id: CodeActionId,
        span: Span,
        new_text: String,
        diagnostic: &Diagnostic,
    ) -> Option<CodeAction> {
        match self.model.range_of(span) {
            Ok(range) => Some(CodeAction {
                title,
                id,
                diagnostics: vec![diagnostic.clone()],
                fix: Fix::Edits(vec![TextEdit { range, span, new_text }]),
            }),
            Err(err) => {
                warn!(uri = self.model.uri(), error = %err, "dropping code action outside of the document");
                None
            }
        }
    }
}

fn exclude_unknown(pattern: String, diagnostic: &Diagnostic) -> CodeAction {
    CodeAction {
        title: format!("Exclude '{pattern}' from unknown property validation?"),
        id: CodeActionId::IgnoreUnknownProperty,
        diagnostics: vec![diagnostic.clone()],
        fix: Fix::ExcludeUnknown { pattern },
    }
}

/// The value `node` belongs to, if it is a value or one of its fragments.
fn enclosing_value(node: Node<'_>) -> Option<PropertyValue<'_>> {
    node.as_value().or_else(|| node.parent()?.as_value())
}
