//! Diagnostics for a [`Model`] against a [`MetadataCatalog`].
//!
//! Rules run one after another, each over the whole document, and the
//! cancellation checker is polled before every rule. A rule never depends on
//! another rule's output. Rules whose severity is [`Severity::None`] are
//! skipped.
//!
//! | rule         | reported at          | message                                  |
//! |--------------|----------------------|------------------------------------------|
//! | `syntax`     | key / bad character  | `Missing equals sign after 'k'`          |
//! | `unknown`    | key                  | `Unknown property 'k'`                   |
//! | `duplicate`  | every repeated key   | `Duplicate property 'k'`                 |
//! | `value`      | value                | `Invalid enum value: ...`, type mismatch |
//! | `required`   | document start       | `Missing required property 'k'`          |
//! | `expression` | expression           | `Missing '}'`, unknown reference         |

mod diagnostic;
mod exclusions;
mod settings;


use std::collections::{HashMap, HashSet};

pub use diagnostic::{Diagnostic, Severity, ValidationCode};
use exclusions::Exclusions;
pub use settings::{RuleSettings, ValidationSettings};
use tracing::warn;

use crate::{
    cancel::{CancelChecker, Cancelled},
    metadata::{ItemMetadata, MetadataCatalog, ValueKind},
    model::{Model, Property},
    text::Span,
};

/// Validates `model`.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` fired between two rules.
///
/// ```rust
/// use propsense::{
///     ItemMetadata, MetadataCatalog, Model, NeverCancel, ValidationCode, ValidationSettings, validate,
/// };
///
/// let catalog = MetadataCatalog::new(vec![ItemMetadata::new("quarkus.http.port")], vec![]);
/// let model = Model::parse("file:///application.properties", "quarkus.http.prot=80", &NeverCancel).unwrap();
/// let diagnostics = validate(&model, &catalog, &ValidationSettings::default(), &NeverCancel).unwrap();
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].code, ValidationCode::Unknown);
/// assert_eq!(diagnostics[0].message, "Unknown property 'quarkus.http.prot'");
/// ```
pub fn validate<C: CancelChecker + ?Sized>(
    model: &Model,
    catalog: &MetadataCatalog,
    settings: &ValidationSettings,
    cancel: &C,
) -> Result<Vec<Diagnostic>, Cancelled> {
    let mut validator = Validator { model, catalog, settings, diagnostics: Vec::new() };
    if !settings.enabled {
        return Ok(validator.diagnostics);
    }

    for code in [
        ValidationCode::Syntax,
        ValidationCode::Unknown,
        ValidationCode::Duplicate,
        ValidationCode::Value,
        ValidationCode::Required,
        ValidationCode::Expression,
    ] {
        cancel.check_cancelled()?;
        let rule = settings.rule(code);
        if !rule.is_enabled() {
            continue;
        }
        let exclusions = Exclusions::new(&rule.excluded);
        match code {
            ValidationCode::Syntax => validator.validate_syntax(&exclusions),
            ValidationCode::Unknown => validator.validate_unknown(&exclusions),
            ValidationCode::Duplicate => validator.validate_duplicates(&exclusions),
            ValidationCode::Value => validator.validate_values(&exclusions),
            ValidationCode::Required => validator.validate_required(&exclusions),
            ValidationCode::Expression => validator.validate_expressions(&exclusions),
        }
    }
    Ok(validator.diagnostics)
}

struct Validator<'a> {
    model: &'a Model,
    catalog: &'a MetadataCatalog,
    settings: &'a ValidationSettings,
    diagnostics: Vec<Diagnostic>,
}

impl Validator<'_> {
    fn report(
        &mut self,
        code: ValidationCode,
        span: Span,
        message: String,
        property_name: Option<String>,
    ) {
        match self.model.range_of(span) {
            Ok(range) => self.diagnostics.push(Diagnostic {
                range,
                span,
                severity: self.settings.rule(code).severity,
                code,
                message,
                property_name,
            }),
            Err(err) => warn!(%code, error = %err, "dropping diagnostic outside of the document"),
        }
    }

    fn validate_syntax(&mut self, exclusions: &Exclusions) {
        let model = self.model;
        for property in model.properties() {
            let Some(key) = property.key() else { continue };
            let Some(span) = key.node().span() else { continue };
            if property.assign().is_some() || span.is_empty() {
                continue;
            }
            let name = property.property_name_with_profile().unwrap_or_default();
            if exclusions.is_excluded(&name) {
                continue;
            }
            let message = format!("Missing equals sign after '{name}'");
            self.report(ValidationCode::Syntax, span, message, Some(name.into_owned()));
        }
        for error in model.parse_errors() {
            let span = Span::new(error.offset, error.offset + 1);
            self.report(ValidationCode::Syntax, span, error.kind.to_string(), None);
        }
    }

    fn validate_unknown(&mut self, exclusions: &Exclusions) {
        for property in self.model.properties() {
            let name = property.property_name();
            if name.is_empty() || self.catalog.get_property(&name).is_some() {
                continue;
            }
            if is_excluded(exclusions, property) {
                continue;
            }
            let Some(span) = property.key().and_then(|key| key.node().span()) else { continue };
            let message = format!("Unknown property '{name}'");
            self.report(ValidationCode::Unknown, span, message, Some(name.into_owned()));
        }
    }

    fn validate_duplicates(&mut self, exclusions: &Exclusions) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for property in self.model.properties() {
            if let Some(name) = property.property_name_with_profile() {
                if !name.is_empty() {
                    *counts.entry(name.into_owned()).or_default() += 1;
                }
            }
        }
        for property in self.model.properties() {
            let Some(name) = property.property_name_with_profile() else { continue };
            if counts.get(name.as_ref()).is_none_or(|&count| count < 2) {
                continue;
            }
            if is_excluded(exclusions, property) {
                continue;
            }
            let Some(span) = property.key().and_then(|key| key.node().span()) else { continue };
            let message = format!("Duplicate property '{name}'");
            self.report(ValidationCode::Duplicate, span, message, Some(name.into_owned()));
        }
    }

    fn validate_values(&mut self, exclusions: &Exclusions) {
        for property in self.model.properties() {
            let Some(value) = property.value() else { continue };
            let Some(text) = value.value() else { continue };
            let text = text.trim();
            if text.is_empty() || property.is_value_expression() {
                continue;
            }
            let name = property.property_name();
            let Some(metadata) = self.catalog.get_property(&name) else { continue };
            if is_excluded(exclusions, property) {
                continue;
            }
            let Some(message) = self.value_error(metadata, text) else { continue };
            let Some(span) = value.node().span() else { continue };
            self.report(ValidationCode::Value, span, message, Some(name.into_owned()));
        }
    }

    /// Why `value` is not acceptable for `metadata`, if it is not.
    fn value_error(&self, metadata: &ItemMetadata, value: &str) -> Option<String> {
        let type_name = metadata.type_name.as_deref().unwrap_or("String");
        if self.catalog.hint_for(metadata).is_some() {
            return (!self.catalog.is_valid_enum(metadata, value))
                .then(|| format!("Invalid enum value: '{value}' is invalid for type {type_name}"));
        }
        let valid = match metadata.value_kind() {
            ValueKind::Boolean => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            ValueKind::Integer => is_integer(value),
            ValueKind::Float => value.parse::<f64>().is_ok(),
            ValueKind::Other => true,
        };
        (!valid).then(|| format!("Type mismatch: {type_name} expected"))
    }

    fn validate_required(&mut self, exclusions: &Exclusions) {
        let catalog = self.catalog;
        for metadata in catalog.properties() {
            if !metadata.required || metadata.is_pattern() || exclusions.is_excluded(&metadata.name)
            {
                continue;
            }
            if self.model.has_key(&metadata.name) {
                continue;
            }
            let message = format!("Missing required property '{}'", metadata.name);
            self.report(ValidationCode::Required, Span::new(0, 0), message, Some(metadata.name.clone()));
        }
    }

    fn validate_expressions(&mut self, exclusions: &Exclusions) {
        let model = self.model;
        let declared: HashSet<_> = model.properties().map(Property::property_name).collect();
        for property in model.properties() {
            let Some(value) = property.value() else { continue };
            if is_excluded(exclusions, property) {
                continue;
            }
            for expression in value.expressions() {
                let Some(span) = expression.node().span() else { continue };
                // a bare `$` is literal text
                let Some(reference) = expression.reference_name() else { continue };
                if !expression.is_closed() {
                    self.report(ValidationCode::Expression, span, "Missing '}'".to_owned(), None);
                    continue;
                }
                if reference.is_empty()
                    || expression.default_value().is_some()
                    || is_environment_variable(&reference)
                    || declared.contains(reference.as_ref())
                    || self.catalog.get_property(&reference).is_some()
                {
                    continue;
                }
                let message = format!("Unknown referenced property '{reference}'");
                self.report(ValidationCode::Expression, span, message, Some(reference.into_owned()));
            }
        }
    }
}

/// Matches exclusion globs against the name with and without profile.
fn is_excluded(exclusions: &Exclusions, property: Property<'_>) -> bool {
    exclusions.is_excluded(&property.property_name())
        || property.property_name_with_profile().is_some_and(|name| exclusions.is_excluded(&name))
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `FOO_BAR` style names resolve from the environment, not the document.
fn is_environment_variable(name: &str) -> bool {
    name.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}
