//! Text buffer with offset/position conversion.
//!
//! Offsets throughout the crate are *character* offsets (Unicode scalar
//! values), not byte offsets. `TextBuffer` keeps the document in a
//! [`ropey::Rope`] for edits and offset ↔ position conversion, next to the
//! flat text the parser reads. Lines end at `\n`, `\r\n` or a lone `\r`.

use std::sync::Arc;

use ropey::{Rope, RopeSlice};
use thiserror::Error;

/// A zero-based line/character position. `character` counts Unicode scalar
/// values from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A half-open `[start, end)` range of positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty range at `position`.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self { start: position, end: position }
    }
}

/// A half-open `[start, end)` range of character offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Inclusive on both ends: an offset right after the last character still
    /// belongs to the span, which is what cursor-based lookups want.
    #[must_use]
    pub const fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// An edit notification. `range == None` replaces the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct TextChange {
    pub range: Option<Range>,
    pub text: String,
}

impl TextChange {
    /// A change replacing the full document.
    pub fn full(text: impl Into<String>) -> Self {
        Self { range: None, text: text.into() }
    }

    /// A change replacing `range` with `text`.
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self { range: Some(range), text: text.into() }
    }
}

/// A position or offset that does not exist in the document.
///
/// Conversions never clamp: a diagnostic computed against a stale position
/// must surface as an error rather than silently land somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadLocation {
    #[error("offset {offset} is outside of the document (length {len})")]
    Offset { offset: usize, len: usize },
    #[error("line {line} is outside of the document ({lines} lines)")]
    Line { line: usize, lines: usize },
    #[error("character {character} is outside of line {line} (length {len})")]
    Character { line: usize, character: usize, len: usize },
}

/// The text of one document at one version.
///
/// Cloning is cheap: the rope and the flat text it was rendered to are both
/// shared.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    uri: Arc<str>,
    text: Arc<str>,
    rope: Rope,
    version: i32,
}

impl TextBuffer {
    /// Creates a buffer for `uri` holding `text` at `version`.
    pub fn new(uri: impl Into<Arc<str>>, text: impl Into<Arc<str>>, version: i32) -> Self {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Self { uri: uri.into(), text, rope, version }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Number of characters in the document.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Replaces the whole text.
    pub fn set_text(&mut self, text: impl Into<Arc<str>>, version: i32) {
        let text = text.into();
        self.rope = Rope::from_str(&text);
        self.text = text;
        self.version = version;
    }

    /// Applies `changes` in order, each one against the text produced by the
    /// previous one.
    ///
    /// # Errors
    ///
    /// Fails if a change range lies outside the document; the buffer is left
    /// untouched in that case.
    pub fn apply_changes(&mut self, changes: &[TextChange], version: i32) -> Result<(), BadLocation> {
        let mut rope = self.rope.clone();
        for change in changes {
            match change.range {
                None => rope = Rope::from_str(&change.text),
                Some(range) => {
                    let start = offset_in(&rope, range.start)?;
                    let end = offset_in(&rope, range.end)?;
                    let (start, end) = (start.min(end), start.max(end));
                    rope.remove(start..end);
                    rope.insert(start, &change.text);
                }
            }
        }
        self.text = Arc::from(rope.to_string());
        self.rope = rope;
        self.version = version;
        Ok(())
    }

    /// The character at `offset`, if any.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// The text between two character offsets, or `None` if the span is
    /// reversed or out of bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.rope.len_chars() {
            return None;
        }
        Some(&self.text[self.rope.char_to_byte(start)..self.rope.char_to_byte(end)])
    }

    /// Converts a position into a character offset.
    ///
    /// # Errors
    ///
    /// Fails if the line does not exist or the character lies beyond the end
    /// of the line's content.
    pub fn offset_at(&self, position: Position) -> Result<usize, BadLocation> {
        offset_in(&self.rope, position)
    }

    /// Converts a character offset into a position.
    ///
    /// # Errors
    ///
    /// Fails if `offset` is past the end of the document.
    pub fn position_at(&self, offset: usize) -> Result<Position, BadLocation> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(BadLocation::Offset { offset, len });
        }
        let line = self.rope.char_to_line(offset);
        Ok(Position::new(line, offset - self.rope.line_to_char(line)))
    }

    /// Converts a span into a range.
    ///
    /// # Errors
    ///
    /// Fails if either end of the span is outside the document.
    pub fn range_of(&self, span: Span) -> Result<Range, BadLocation> {
        Ok(Range::new(self.position_at(span.start)?, self.position_at(span.end)?))
    }

    /// Converts a range into a span.
    ///
    /// # Errors
    ///
    /// Fails if either end of the range is outside the document.
    pub fn span_of(&self, range: Range) -> Result<Span, BadLocation> {
        Ok(Span::new(self.offset_at(range.start)?, self.offset_at(range.end)?))
    }

    /// The terminator of `line`, falling back to the first terminator of the
    /// document and then to `"\n"`.
    #[must_use]
    pub fn line_delimiter(&self, line: usize) -> &'static str {
        let delimiter = |line: usize| {
            (line < self.rope.len_lines()).then(|| delimiter_of(self.rope.line(line))).flatten()
        };
        delimiter(line).or_else(|| delimiter(0)).unwrap_or("\n")
    }
}

fn offset_in(rope: &Rope, position: Position) -> Result<usize, BadLocation> {
    let lines = rope.len_lines();
    if position.line >= lines {
        return Err(BadLocation::Line { line: position.line, lines });
    }
    let line = rope.line(position.line);
    let len = line.len_chars() - delimiter_of(line).map_or(0, str::len);
    if position.character > len {
        return Err(BadLocation::Character {
            line: position.line,
            character: position.character,
            len,
        });
    }
    Ok(rope.line_to_char(position.line) + position.character)
}

/// The terminator a rope line ends with; the last line has none.
fn delimiter_of(line: RopeSlice<'_>) -> Option<&'static str> {
    let len = line.len_chars();
    if len == 0 {
        return None;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => Some("\r\n"),
        '\n' => Some("\n"),
        '\r' => Some("\r"),
        _ => None,
    }
}
