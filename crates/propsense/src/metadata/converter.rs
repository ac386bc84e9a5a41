use std::borrow::Cow;

use heck::ToKebabCase;

/// How a property's string value maps onto its declared values. An enum
/// constant `FOO_BAR` is accepted as `foo-bar` under [`KebabCase`] and as
/// `FOO_BAR` under [`Verbatim`].
///
/// [`KebabCase`]: ConverterKind::KebabCase
/// [`Verbatim`]: ConverterKind::Verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ConverterKind {
    KebabCase,
    Verbatim,
}

impl ConverterKind {
    #[must_use]
    pub fn convert(self, value: &str) -> Cow<'_, str> {
        match self {
            Self::KebabCase => Cow::Owned(value.to_kebab_case()),
            Self::Verbatim => Cow::Borrowed(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("FOO_BAR", "foo-bar")]
    #[case("fooBar", "foo-bar")]
    #[case("HTTP_2", "http-2")]
    #[case("already-kebab", "already-kebab")]
    #[case("DEV__TEST", "dev-test")]
    fn kebab_case(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(ConverterKind::KebabCase.convert(value), expected);
        assert_eq!(ConverterKind::Verbatim.convert(value), value);
    }
}
