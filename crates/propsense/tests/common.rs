#![allow(missing_docs, dead_code)]

use std::fmt::Write;

pub const URI: &str = "file:///src/main/resources/application.properties";

/// The metadata of a small application, in the shape the catalog provider
/// hands over.
pub const CATALOG_JSON: &str = r#"{
    "properties": [
        { "name": "quarkus.application.name", "type": "java.lang.String", "required": true },
        { "name": "quarkus.http.port", "type": "int", "defaultValue": "8080" },
        { "name": "quarkus.http.host", "type": "java.lang.String" },
        { "name": "quarkus.http.ssl.enabled", "type": "java.util.Optional<java.lang.Boolean>" },
        {
            "name": "quarkus.log.level",
            "type": "java.util.logging.Level",
            "converterKinds": ["KEBAB_CASE", "VERBATIM"]
        },
        { "name": "quarkus.datasource.{*}.jdbc.url", "type": "java.lang.String", "required": true },
        { "name": "greeting.message", "type": "java.lang.String", "required": true },
        { "name": "greeting.suffix", "type": "java.lang.String", "required": true }
    ],
    "hints": [
        {
            "name": "java.util.logging.Level",
            "values": [
                { "value": "OFF" },
                { "value": "SEVERE" },
                { "value": "WARNING" },
                { "value": "INFO" },
                { "value": "FINE" },
                { "value": "ALL" }
            ]
        }
    ]
}"#;

/// A document of `lines` properties with a comment every tenth line and a
/// continuation every seventh.
pub fn large_document(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        if i % 10 == 0 {
            let _ = writeln!(text, "# section {i}");
        }
        if i % 7 == 0 {
            let _ = writeln!(text, "%dev.app.item{i}.value = first \\\n    ${{app.item{i}.base:{i}}}");
        } else {
            let _ = writeln!(text, "app.item{i}.value={i}");
        }
    }
    text
}
