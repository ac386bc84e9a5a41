//! Line-driven `.properties` scanner.
//!
//! Overview
//! - [`parse`] walks the text once and reports structural events to a
//!   [`PropertiesHandler`]. It never builds strings; consumers resolve text
//!   from the offsets they receive.
//! - A [`ParseState`] value is threaded through the line loop. It records
//!   which construct is still open when a physical line ends with a
//!   continuation backslash, so the next line resumes that construct instead
//!   of starting a new property.
//! - The cancellation checker is polled once per physical line. On
//!   cancellation `parse` returns `Err(Cancelled)` immediately; the handler
//!   is left with a truncated stream and must be discarded.
//!
//! Grammar, per physical line
//! - After leading spaces/tabs, `#` or `;` starts a comment and an empty
//!   remainder is a blank line. Both only apply when no construct is open.
//! - A key runs until an unescaped `=`, `:`, space or tab. A backslash escapes
//!   the next character; a backslash right before the end of the line
//!   continues the current construct on the next line.
//! - After the key come optional whitespace, a one character delimiter,
//!   optional whitespace and the value. Without a delimiter the rest of the
//!   line is skipped.
//! - A value is a sequence of literal runs and expression runs. `$` opens an
//!   expression; if it is followed by `{` the expression extends to the first
//!   `}`, otherwise it is just the `$`.
//!
//! Malformed input never stops the scan: control characters are reported
//! through [`PropertiesHandler::error`] and consumed, and whatever is open at
//! end of input is closed there.

mod error;
mod event;
mod scanner;


pub use error::{ParseError, ParseErrorKind};
pub use event::{ParseEvent, PropertiesHandler};
use scanner::Scanner;

use crate::cancel::{CancelChecker, Cancelled};

/// What the next physical line continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Nothing is open; the next line starts fresh.
    Property,
    PropertyName,
    PropertyValue,
    PropertyValueExpression,
    PropertyValueLiteral,
}

/// Which kind of run [`Parser::read_run`] is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Name,
    Literal,
    Expression,
}

/// Parses `text`, reporting events to `handler`.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` fired; events reported so far describe
/// an incomplete document.
///
/// # Examples
///
/// ```rust
/// use propsense::{NeverCancel, ParseEvent, parse};
///
/// let mut events: Vec<ParseEvent> = Vec::new();
/// parse("a=1", &mut events, &NeverCancel).unwrap();
/// assert_eq!(events.first(), Some(&ParseEvent::StartDocument(0)));
/// assert_eq!(events.last(), Some(&ParseEvent::EndDocument(3)));
/// ```
pub fn parse<H, C>(text: &str, handler: &mut H, cancel: &C) -> Result<(), Cancelled>
where
    H: PropertiesHandler + ?Sized,
    C: CancelChecker + ?Sized,
{
    Parser { scanner: Scanner::new(text), state: ParseState::Property, handler }.run(cancel)
}

struct Parser<'src, 'h, H: PropertiesHandler + ?Sized> {
    scanner: Scanner<'src>,
    state: ParseState,
    handler: &'h mut H,
}

impl<H: PropertiesHandler + ?Sized> Parser<'_, '_, H> {
    fn run<C: CancelChecker + ?Sized>(mut self, cancel: &C) -> Result<(), Cancelled> {
        self.handler.start_document(0);
        self.scanner.skip_bom();
        while !self.scanner.is_eof() {
            cancel.check_cancelled()?;
            self.read_line();
            self.scanner.skip_line_terminator();
        }
        let end = self.scanner.offset();
        self.close_open(end);
        self.handler.end_document(end);
        Ok(())
    }

    /// Reads one physical line up to, but excluding, its terminator.
    fn read_line(&mut self) {
        self.scanner.skip_whitespace();
        if self.scanner.is_eol() {
            // a continuation followed by an empty line ends the construct
            let offset = self.scanner.offset();
            self.close_open(offset);
            self.handler.blank_line(offset);
            return;
        }

        if matches!(self.scanner.current(), Some('#' | ';')) {
            // a comment line ends a construct left open by a continuation
            self.close_open(self.scanner.offset());
            self.read_comment();
            return;
        }

        match self.state {
            ParseState::Property => self.read_property(),
            ParseState::PropertyName => {
                if !self.read_run(Run::Name) {
                    self.read_after_name();
                }
            }
            ParseState::PropertyValue => self.continue_value_and_close(),
            ParseState::PropertyValueLiteral => {
                if !self.read_run(Run::Literal) {
                    self.handler.end_property_value_literal(self.scanner.offset());
                    self.continue_value_and_close();
                }
            }
            ParseState::PropertyValueExpression => {
                if !self.read_run(Run::Expression) {
                    self.handler.end_property_value_expression(self.scanner.offset());
                    self.continue_value_and_close();
                }
            }
        }
    }

    fn read_comment(&mut self) {
        self.handler.start_comment(self.scanner.offset());
        self.scanner.skip_until_eol();
        self.handler.end_comment(self.scanner.offset());
    }

    fn read_property(&mut self) {
        let offset = self.scanner.offset();
        self.handler.start_property(offset);
        self.handler.start_property_name(offset);
        if self.read_run(Run::Name) {
            self.state = ParseState::PropertyName;
        } else {
            self.read_after_name();
        }
    }

    /// Closes the key and reads the delimiter and the value, if any.
    fn read_after_name(&mut self) {
        self.handler.end_property_name(self.scanner.offset());
        self.scanner.skip_whitespace();

        if !matches!(self.scanner.current(), Some('=' | ':')) {
            self.scanner.skip_until_eol();
            self.end_property();
            return;
        }

        self.handler.delimiter_assign(self.scanner.offset());
        self.scanner.read();
        self.scanner.skip_whitespace();

        if self.scanner.is_eof() {
            self.end_property();
            return;
        }

        self.handler.start_property_value(self.scanner.offset());
        self.continue_value_and_close();
    }

    fn continue_value_and_close(&mut self) {
        self.state = ParseState::PropertyValue;
        if !self.continue_value() {
            self.end_property();
        }
    }

    /// Reads value fragments until the end of the line. Returns `true` if a
    /// fragment continues on the next line, in which case `state` says which.
    fn continue_value(&mut self) -> bool {
        while !self.scanner.is_eol() {
            if self.scanner.current() == Some('$') {
                self.handler.start_property_value_expression(self.scanner.offset());
                self.scanner.read();
                if self.scanner.current() != Some('{') {
                    self.handler.end_property_value_expression(self.scanner.offset());
                    continue;
                }
                if self.read_run(Run::Expression) {
                    self.state = ParseState::PropertyValueExpression;
                    return true;
                }
                self.handler.end_property_value_expression(self.scanner.offset());
            } else {
                self.handler.start_property_value_literal(self.scanner.offset());
                if self.read_run(Run::Literal) {
                    self.state = ParseState::PropertyValueLiteral;
                    return true;
                }
                self.handler.end_property_value_literal(self.scanner.offset());
            }
        }
        self.handler.end_property_value(self.scanner.offset());
        false
    }

    fn end_property(&mut self) {
        self.handler.end_property(self.scanner.offset());
        self.state = ParseState::Property;
    }

    /// Reads a run of `run` characters. Returns `true` if the line ended with
    /// a continuation backslash, `false` if the run stopped normally.
    fn read_run(&mut self, run: Run) -> bool {
        loop {
            let Some(ch) = self.scanner.current() else {
                return false;
            };
            match ch {
                '\n' | '\r' => return false,
                '\\' => {
                    self.scanner.read();
                    match self.scanner.current() {
                        Some('\n' | '\r') => return true,
                        None => return false,
                        // escaped character: never a stop character
                        Some(escaped) => self.consume(escaped),
                    }
                }
                '=' | ':' | ' ' | '\t' if run == Run::Name => return false,
                '$' if run == Run::Literal => return false,
                _ => {
                    self.consume(ch);
                    if run == Run::Expression && self.scanner.last() == Some('}') {
                        return false;
                    }
                }
            }
        }
    }

    /// Consumes `ch`, reporting it first if it is a control character.
    fn consume(&mut self, ch: char) {
        if ch < ' ' && ch != '\t' {
            self.handler.error(ParseError {
                kind: ParseErrorKind::InvalidCharacter(ch),
                offset: self.scanner.offset(),
                position: self.scanner.position(),
            });
        }
        self.scanner.read();
    }

    /// Closes whatever construct is still open, innermost first.
    fn close_open(&mut self, offset: usize) {
        match self.state {
            ParseState::Property => return,
            ParseState::PropertyName => self.handler.end_property_name(offset),
            ParseState::PropertyValue => self.handler.end_property_value(offset),
            ParseState::PropertyValueExpression => {
                self.handler.end_property_value_expression(offset);
                self.handler.end_property_value(offset);
            }
            ParseState::PropertyValueLiteral => {
                self.handler.end_property_value_literal(offset);
                self.handler.end_property_value(offset);
            }
        }
        self.handler.end_property(offset);
        self.state = ParseState::Property;
    }
}
