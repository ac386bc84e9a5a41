//! Character cursor over the input text.
//!
//! What it does
//! - Holds one character of lookahead (`current`) and the previously consumed
//!   character (`last`), and the character offset of `current`.
//! - Tracks the zero-based line and the offset at which that line starts so
//!   error events can carry a position.
//!
//! Invariants
//! - `offset` is the character offset of `current`; at end of input it equals
//!   the character length of the text and never grows past it.
//! - Line terminators are only consumed through [`Scanner::skip_line_terminator`],
//!   which is what keeps `line` accurate.

use core::str::Chars;

use crate::text::Position;

#[derive(Debug, Clone)]
pub(crate) struct Scanner<'src> {
    chars: Chars<'src>,
    current: Option<char>,
    last: Option<char>,
    offset: usize,
    line: usize,
    line_start: usize,
}

impl<'src> Scanner<'src> {
    pub(crate) fn new(text: &'src str) -> Self {
        let mut chars = text.chars();
        let current = chars.next();
        Self { chars, current, last: None, offset: 0, line: 0, line_start: 0 }
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<char> {
        self.current
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<char> {
        self.last
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn position(&self) -> Position {
        Position::new(self.line, self.offset - self.line_start)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// `true` at a line terminator or at end of input.
    #[inline]
    pub(crate) fn is_eol(&self) -> bool {
        matches!(self.current, None | Some('\n' | '\r'))
    }

    #[inline]
    pub(crate) fn is_whitespace(&self) -> bool {
        matches!(self.current, Some(' ' | '\t'))
    }

    /// Consumes `current`. A no-op at end of input.
    #[inline]
    pub(crate) fn read(&mut self) {
        if self.current.is_some() {
            self.last = self.current;
            self.current = self.chars.next();
            self.offset += 1;
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.is_whitespace() {
            self.read();
        }
    }

    pub(crate) fn skip_until_eol(&mut self) {
        while !self.is_eol() {
            self.read();
        }
    }

    /// Consumes a byte order mark at the very start of the input.
    pub(crate) fn skip_bom(&mut self) {
        if self.offset == 0 && self.current == Some('\u{feff}') {
            self.read();
            self.line_start = self.offset;
        }
    }

    /// Consumes one `\n`, `\r\n` or `\r` terminator and moves to the next
    /// line. Returns `false` if `current` is not a terminator.
    pub(crate) fn skip_line_terminator(&mut self) -> bool {
        match self.current {
            Some('\r') => {
                self.read();
                if self.current == Some('\n') {
                    self.read();
                }
            }
            Some('\n') => self.read(),
            _ => return false,
        }
        self.line += 1;
        self.line_start = self.offset;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_stop_at_end_of_input() {
        let mut s = Scanner::new("ab");
        assert_eq!(s.current(), Some('a'));
        s.read();
        s.read();
        assert!(s.is_eof());
        assert_eq!(s.offset(), 2);
        assert_eq!(s.last(), Some('b'));
        s.read();
        assert_eq!(s.offset(), 2);
    }

    #[test]
    fn terminators_advance_lines() {
        let mut s = Scanner::new("a\r\nb\rc\nd");
        let mut positions = Vec::new();
        loop {
            s.skip_until_eol();
            if !s.skip_line_terminator() {
                break;
            }
            positions.push((s.current(), s.position()));
        }
        assert_eq!(
            positions,
            vec![
                (Some('b'), Position::new(1, 0)),
                (Some('c'), Position::new(2, 0)),
                (Some('d'), Position::new(3, 0)),
            ]
        );
    }

    #[test]
    fn bom_is_skipped_once() {
        let mut s = Scanner::new("\u{feff}a=1");
        s.skip_bom();
        assert_eq!(s.current(), Some('a'));
        assert_eq!(s.offset(), 1);
        assert_eq!(s.position(), Position::new(0, 0));
    }
}
