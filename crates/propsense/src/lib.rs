//! Language-service core for `.properties` configuration files.
//!
//! Text goes through a cancellable line-driven [`parse`]r into an immutable
//! [`Model`]. The [`DocumentCache`] keeps one model per open document and
//! parses each version at most once. [`validate`] checks a model against a
//! [`MetadataCatalog`], and [`code_actions_for`] turns the resulting
//! diagnostics into fixes.
//!
//! ```rust
//! use propsense::DocumentCache;
//!
//! let cache = DocumentCache::new();
//! cache.open("file:///application.properties", "%dev.quarkus.http.port = 8080\n", 1);
//! let model = cache.get_model("file:///application.properties").unwrap();
//! let property = model.properties().next().unwrap();
//! assert_eq!(property.profile(), Some("dev"));
//! assert_eq!(property.property_name(), "quarkus.http.port");
//! assert_eq!(property.property_value().as_deref(), Some("8080"));
//! ```

#![allow(missing_docs)]

mod cancel;
mod code_actions;
mod documents;
mod metadata;
mod model;
mod parser;
mod text;
mod validation;

pub use cancel::{CancelChecker, CancellationToken, Cancelled, NeverCancel};
pub use code_actions::{
    CodeAction, CodeActionId, CodeActionSettings, Fix, TextEdit, code_actions_for,
    code_actions_for_diagnostic,
};
pub use documents::{CacheError, DocumentCache};
pub use metadata::{ConverterKind, ItemHint, ItemMetadata, MetadataCatalog, ValueHint, ValueKind, pattern};
pub use model::{
    Model, Node, NodeId, NodeKind, Property, PropertyKey, PropertyValue, PropertyValueExpression,
};
pub use parser::{ParseError, ParseErrorKind, ParseEvent, PropertiesHandler, parse};
pub use text::{BadLocation, Position, Range, Span, TextBuffer, TextChange};
pub use validation::{
    Diagnostic, RuleSettings, Severity, ValidationCode, ValidationSettings, validate,
};
