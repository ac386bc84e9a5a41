use core::fmt;

use crate::text::{Range, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "lowercase"))]
pub enum Severity {
    /// The rule is disabled.
    None,
    Hint,
    Information,
    Warning,
    Error,
}

/// The rule a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "lowercase"))]
pub enum ValidationCode {
    /// A key without delimiter, or a character the scanner rejected.
    Syntax,
    /// A key the catalog does not know.
    Unknown,
    Duplicate,
    /// A value that does not fit the property's type or hint.
    Value,
    /// A required catalog property missing from the document.
    Required,
    /// A malformed or dangling `${...}` reference.
    Expression,
}

impl ValidationCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Unknown => "unknown",
            Self::Duplicate => "duplicate",
            Self::Value => "value",
            Self::Required => "required",
            Self::Expression => "expression",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "camelCase"))]
pub struct Diagnostic {
    pub range: Range,
    pub span: Span,
    pub severity: Severity,
    pub code: ValidationCode,
    pub message: String,
    /// The property the diagnostic is about, when there is one. Fixes read it
    /// instead of parsing the message.
    pub property_name: Option<String>,
}
