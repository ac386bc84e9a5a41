use super::{Severity, ValidationCode};

/// Settings of one validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RuleSettings {
    /// Severity of the rule's diagnostics. [`Severity::None`] disables the
    /// rule.
    pub severity: Severity,
    /// Glob patterns of property names the rule ignores, e.g.
    /// `quarkus.http.*`. Invalid globs are logged and skipped.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded: Vec<String>,
}

impl RuleSettings {
    #[must_use]
    pub const fn new(severity: Severity) -> Self {
        Self { severity, excluded: Vec::new() }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.severity != Severity::None
    }
}

/// Validation configuration. Every rule runs independently.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ValidationSettings {
    /// Turns validation off altogether.
    ///
    /// Default: `true`
    pub enabled: bool,
    /// Default: [`Severity::Error`]
    pub syntax: RuleSettings,
    /// Default: [`Severity::Warning`]
    pub unknown: RuleSettings,
    /// Default: [`Severity::Warning`]
    pub duplicate: RuleSettings,
    /// Default: [`Severity::Error`]
    pub value: RuleSettings,
    /// Default: [`Severity::Warning`]
    pub required: RuleSettings,
    /// Default: [`Severity::Error`]
    pub expression: RuleSettings,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            syntax: RuleSettings::new(Severity::Error),
            unknown: RuleSettings::new(Severity::Warning),
            duplicate: RuleSettings::new(Severity::Warning),
            value: RuleSettings::new(Severity::Error),
            required: RuleSettings::new(Severity::Warning),
            expression: RuleSettings::new(Severity::Error),
        }
    }
}

impl ValidationSettings {
    #[must_use]
    pub fn rule(&self, code: ValidationCode) -> &RuleSettings {
        match code {
            ValidationCode::Syntax => &self.syntax,
            ValidationCode::Unknown => &self.unknown,
            ValidationCode::Duplicate => &self.duplicate,
            ValidationCode::Value => &self.value,
            ValidationCode::Required => &self.required,
            ValidationCode::Expression => &self.expression,
        }
    }

    pub fn rule_mut(&mut self, code: ValidationCode) -> &mut RuleSettings {
        match code {
            ValidationCode::Syntax => &mut self.syntax,
            ValidationCode::Unknown => &mut self.unknown,
            ValidationCode::Duplicate => &mut self.duplicate,
            ValidationCode::Value => &mut self.value,
            ValidationCode::Required => &mut self.required,
            ValidationCode::Expression => &mut self.expression,
        }
    }
}
