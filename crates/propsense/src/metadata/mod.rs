//! The catalog of known properties and value hints.
//!
//! The catalog is supplied by an outside collaborator and never mutated here.
//! Lookups try the exact name first and then every placeholder pattern in
//! declaration order.

mod converter;
pub mod pattern;

use std::{collections::HashMap, sync::LazyLock};

pub use converter::ConverterKind;
use tracing::warn;

/// One known property, or a family of properties if its name contains a
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ItemMetadata {
    pub name: String,
    /// Fully qualified Java type, e.g. `java.lang.Integer`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: Option<String>,
    pub required: bool,
    pub description: Option<String>,
    pub default_value: Option<String>,
    pub converter_kinds: Vec<ConverterKind>,
    /// Name of the hint listing the accepted values. Defaults to a hint named
    /// after the property, then after its type.
    pub hint_ref: Option<String>,
}

/// What kind of value a type accepts, as far as validation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    Other,
}

impl ItemMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_converters(mut self, kinds: impl IntoIterator<Item = ConverterKind>) -> Self {
        self.converter_kinds = kinds.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint_ref = Some(hint.into());
        self
    }

    /// `true` if the name contains a `{*}` or `[*]` placeholder.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        pattern::is_pattern(&self.name)
    }

    /// Classifies the declared type, unwrapping `java.util.Optional<...>`.
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        let Some(type_name) = self.type_name.as_deref() else {
            return ValueKind::Other;
        };
        let type_name = type_name
            .strip_prefix("java.util.Optional<")
            .and_then(|inner| inner.strip_suffix('>'))
            .unwrap_or(type_name);
        match type_name {
            "boolean" | "java.lang.Boolean" => ValueKind::Boolean,
            "int" | "long" | "short" | "byte" | "java.lang.Integer" | "java.lang.Long"
            | "java.lang.Short" | "java.lang.Byte" | "java.util.OptionalInt"
            | "java.util.OptionalLong" | "java.math.BigInteger" => ValueKind::Integer,
            "float" | "double" | "java.lang.Float" | "java.lang.Double"
            | "java.util.OptionalDouble" | "java.math.BigDecimal" => ValueKind::Float,
            _ => ValueKind::Other,
        }
    }
}

/// A named list of accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ItemHint {
    pub name: String,
    pub values: Vec<ValueHint>,
    /// Another hint whose values this one stands for.
    pub handle_as: Option<String>,
}

impl ItemHint {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = ValueHint>) -> Self {
        Self { name: name.into(), values: values.into_iter().collect(), handle_as: None }
    }

    /// The value hint accepting `value` under any of `converters`, or
    /// verbatim when there are none.
    #[must_use]
    pub fn find_value(&self, value: &str, converters: &[ConverterKind]) -> Option<&ValueHint> {
        self.values.iter().find(|hint| hint.accepts(value, converters))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ValueHint {
    pub value: String,
    pub description: Option<String>,
    pub source_type: Option<String>,
}

impl ValueHint {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Self::default() }
    }

    #[must_use]
    pub fn accepts(&self, value: &str, converters: &[ConverterKind]) -> bool {
        if converters.is_empty() {
            return self.value == value;
        }
        converters.iter().any(|kind| kind.convert(&self.value) == value)
    }

    /// The form to suggest: converted by the first converter, if any.
    #[must_use]
    pub fn preferred_value(&self, converters: &[ConverterKind]) -> String {
        match converters.first() {
            Some(kind) => kind.convert(&self.value).into_owned(),
            None => self.value.clone(),
        }
    }
}

static BOOLEAN_VALUES: LazyLock<Vec<ValueHint>> =
    LazyLock::new(|| vec![ValueHint::new("false"), ValueHint::new("true")]);

/// Read-only index over the known properties and hints.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CatalogData"))]
pub struct MetadataCatalog {
    properties: Vec<ItemMetadata>,
    by_name: HashMap<String, usize>,
    patterns: Vec<usize>,
    hints: HashMap<String, ItemHint>,
}

/// Wire shape of a catalog: `{"properties": [...], "hints": [...]}`.
#[cfg(feature = "serde")]
#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct CatalogData {
    properties: Vec<ItemMetadata>,
    hints: Vec<ItemHint>,
}

#[cfg(feature = "serde")]
impl From<CatalogData> for MetadataCatalog {
    fn from(data: CatalogData) -> Self {
        Self::new(data.properties, data.hints)
    }
}

impl MetadataCatalog {
    /// Indexes `properties` and `hints`. Entries without a name are skipped;
    /// for repeated names the first entry wins.
    #[must_use]
    pub fn new(properties: Vec<ItemMetadata>, hints: Vec<ItemHint>) -> Self {
        let mut catalog = Self::default();
        for property in properties {
            if property.name.is_empty() {
                warn!("skipping catalog property without a name");
                continue;
            }
            if catalog.by_name.contains_key(&property.name) {
                warn!(name = %property.name, "skipping repeated catalog property");
                continue;
            }
            let index = catalog.properties.len();
            catalog.by_name.insert(property.name.clone(), index);
            if property.is_pattern() {
                catalog.patterns.push(index);
            }
            catalog.properties.push(property);
        }
        for hint in hints {
            if hint.name.is_empty() {
                warn!("skipping catalog hint without a name");
                continue;
            }
            catalog.hints.entry(hint.name.clone()).or_insert(hint);
        }
        for hint in catalog.hints.values() {
            if let Some(target) = &hint.handle_as {
                if !catalog.hints.contains_key(target) {
                    warn!(hint = %hint.name, %target, "hint refers to an unknown hint");
                }
            }
        }
        catalog
    }

    /// All properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[ItemMetadata] {
        &self.properties
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The property declaring `name`, exactly or through a placeholder
    /// pattern.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&ItemMetadata> {
        if name.is_empty() {
            return None;
        }
        if let Some(&index) = self.by_name.get(name) {
            return Some(&self.properties[index]);
        }
        self.patterns
            .iter()
            .map(|&index| &self.properties[index])
            .find(|property| pattern::matches(name, &property.name))
    }

    #[must_use]
    pub fn hint(&self, name: &str) -> Option<&ItemHint> {
        self.hints.get(name)
    }

    /// The hint attached to `property`.
    #[must_use]
    pub fn hint_for(&self, property: &ItemMetadata) -> Option<&ItemHint> {
        match &property.hint_ref {
            Some(name) => self.hint(name),
            None => self
                .hint(&property.name)
                .or_else(|| property.type_name.as_deref().and_then(|t| self.hint(t))),
        }
    }

    /// The hint `hint` defers to through `handle_as`, if it resolves.
    #[must_use]
    pub fn handle_as(&self, hint: &ItemHint) -> Option<&ItemHint> {
        hint.handle_as.as_deref().and_then(|target| self.hint(target))
    }

    /// The values `property` accepts: its hint's values (through
    /// `handle_as`), or `false`/`true` for boolean types. `None` if the
    /// property is not an enumeration.
    #[must_use]
    pub fn enum_values(&self, property: &ItemMetadata) -> Option<&[ValueHint]> {
        match self.hint_for(property) {
            Some(hint) => Some(self.handle_as(hint).unwrap_or(hint).values.as_slice()),
            None if property.value_kind() == ValueKind::Boolean => Some(BOOLEAN_VALUES.as_slice()),
            None => None,
        }
    }

    /// `true` if `value` is acceptable for `property` as far as its hint is
    /// concerned. Properties without a hint accept everything here.
    #[must_use]
    pub fn is_valid_enum(&self, property: &ItemMetadata, value: &str) -> bool {
        let Some(hint) = self.hint_for(property) else {
            return true;
        };
        let converters = &property.converter_kinds;
        if hint.find_value(value, converters).is_some() {
            return true;
        }
        self.handle_as(hint).is_some_and(|target| target.find_value(value, converters).is_some())
    }
}
