//! Structural events produced by the scanner.
//!
//! Every event carries the character offset at which it happens. A `start_*`
//! offset is the first character of the construct and an `end_*` offset is
//! one past its last character, so the pair forms a half-open span.

use super::ParseError;

/// Receives the event stream of one parse, one method per event. All methods
/// default to doing nothing.
#[allow(unused_variables)]
pub trait PropertiesHandler {
    fn start_document(&mut self, offset: usize) {}
    fn end_document(&mut self, offset: usize) {}
    fn start_property(&mut self, offset: usize) {}
    fn end_property(&mut self, offset: usize) {}
    fn start_property_name(&mut self, offset: usize) {}
    fn end_property_name(&mut self, offset: usize) {}
    /// The `=` or `:` delimiter. It is always exactly one character wide.
    fn delimiter_assign(&mut self, offset: usize) {}
    fn start_property_value(&mut self, offset: usize) {}
    fn end_property_value(&mut self, offset: usize) {}
    fn start_property_value_literal(&mut self, offset: usize) {}
    fn end_property_value_literal(&mut self, offset: usize) {}
    fn start_property_value_expression(&mut self, offset: usize) {}
    fn end_property_value_expression(&mut self, offset: usize) {}
    fn start_comment(&mut self, offset: usize) {}
    fn end_comment(&mut self, offset: usize) {}
    fn blank_line(&mut self, offset: usize) {}
    fn error(&mut self, error: ParseError) {}
}

/// The event stream in value form, handy for recording and snapshotting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
pub enum ParseEvent {
    StartDocument(usize),
    EndDocument(usize),
    StartProperty(usize),
    EndProperty(usize),
    StartPropertyName(usize),
    EndPropertyName(usize),
    DelimiterAssign(usize),
    StartPropertyValue(usize),
    EndPropertyValue(usize),
    StartPropertyValueLiteral(usize),
    EndPropertyValueLiteral(usize),
    StartPropertyValueExpression(usize),
    EndPropertyValueExpression(usize),
    StartComment(usize),
    EndComment(usize),
    BlankLine(usize),
    Error(ParseError),
}

/// Records every event in order.
impl PropertiesHandler for Vec<ParseEvent> {
    fn start_document(&mut self, offset: usize) {
        self.push(ParseEvent::StartDocument(offset));
    }

    fn end_document(&mut self, offset: usize) {
        self.push(ParseEvent::EndDocument(offset));
    }

    fn start_property(&mut self, offset: usize) {
        self.push(ParseEvent::StartProperty(offset));
    }

    fn end_property(&mut self, offset: usize) {
        self.push(ParseEvent::EndProperty(offset));
    }

    fn start_property_name(&mut self, offset: usize) {
        self.push(ParseEvent::StartPropertyName(offset));
    }

    fn end_property_name(&mut self, offset: usize) {
        self.push(ParseEvent::EndPropertyName(offset));
    }

    fn delimiter_assign(&mut self, offset: usize) {
        self.push(ParseEvent::DelimiterAssign(offset));
    }

    fn start_property_value(&mut self, offset: usize) {
        self.push(ParseEvent::StartPropertyValue(offset));
    }

    fn end_property_value(&mut self, offset: usize) {
        self.push(ParseEvent::EndPropertyValue(offset));
    }

    fn start_property_value_literal(&mut self, offset: usize) {
        self.push(ParseEvent::StartPropertyValueLiteral(offset));
    }

    fn end_property_value_literal(&mut self, offset: usize) {
        self.push(ParseEvent::EndPropertyValueLiteral(offset));
    }

    fn start_property_value_expression(&mut self, offset: usize) {
        self.push(ParseEvent::StartPropertyValueExpression(offset));
    }

    fn end_property_value_expression(&mut self, offset: usize) {
        self.push(ParseEvent::EndPropertyValueExpression(offset));
    }

    fn start_comment(&mut self, offset: usize) {
        self.push(ParseEvent::StartComment(offset));
    }

    fn end_comment(&mut self, offset: usize) {
        self.push(ParseEvent::EndComment(offset));
    }

    fn blank_line(&mut self, offset: usize) {
        self.push(ParseEvent::BlankLine(offset));
    }

    fn error(&mut self, error: ParseError) {
        self.push(ParseEvent::Error(error));
    }
}
