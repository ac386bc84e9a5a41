use thiserror::Error;

use crate::text::Position;

/// A recoverable problem found while scanning. Parsing always continues past
/// it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[error("{kind} at {}:{}", .position.line + 1, .position.character + 1)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Character offset of the offending character.
    pub offset: usize,
    pub position: Position,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("invalid character {0:?}, expected a valid string character")]
    InvalidCharacter(char),
}
