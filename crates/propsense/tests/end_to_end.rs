#![expect(missing_docs)]

mod common;

use common::{CATALOG_JSON, URI};
use propsense::{
    CodeActionSettings, DocumentCache, Fix, MetadataCatalog, NeverCancel, Position, Severity,
    ValidationCode, ValidationSettings, code_actions_for, validate,
};
use serde_json::json;

const DOCUMENT: &str = "# Greeting
greeting.message = hello
quarkus.http.prot=8080
quarkus.log.level=warn
%dev.quarkus.http.port=80a
quarkus.datasource.db.jdbc.url=jdbc:h2:mem
quarkus.http.host=${host.name}
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn catalog() -> MetadataCatalog {
    serde_json::from_str(CATALOG_JSON).expect("catalog JSON is well formed")
}

#[test]
fn catalog_from_json() {
    let catalog = catalog();
    assert_eq!(catalog.properties().len(), 8);
    let port = catalog.get_property("quarkus.http.port").expect("declared");
    assert_eq!(port.default_value.as_deref(), Some("8080"));
    let url = catalog.get_property("quarkus.datasource.mydb.jdbc.url").expect("pattern");
    assert!(url.required && url.is_pattern());
    let level = catalog.get_property("quarkus.log.level").expect("declared");
    assert!(catalog.is_valid_enum(level, "warning"));
    assert!(catalog.is_valid_enum(level, "WARNING"));
}

#[test]
fn validate_a_document() {
    init_tracing();
    let cache = DocumentCache::new();
    cache.open(URI, DOCUMENT, 1);
    let model = cache.get_model(URI).expect("document is open");
    let diagnostics =
        validate(&model, &catalog(), &ValidationSettings::default(), &NeverCancel).expect("not cancelled");

    let summary: Vec<_> = diagnostics
        .iter()
        .map(|d| (d.code, d.message.as_str(), d.range.start, d.range.end))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                ValidationCode::Unknown,
                "Unknown property 'quarkus.http.prot'",
                Position::new(2, 0),
                Position::new(2, 17),
            ),
            (
                ValidationCode::Value,
                "Invalid enum value: 'warn' is invalid for type java.util.logging.Level",
                Position::new(3, 18),
                Position::new(3, 22),
            ),
            (
                ValidationCode::Value,
                "Type mismatch: int expected",
                Position::new(4, 23),
                Position::new(4, 26),
            ),
            (
                ValidationCode::Required,
                "Missing required property 'quarkus.application.name'",
                Position::new(0, 0),
                Position::new(0, 0),
            ),
            (
                ValidationCode::Required,
                "Missing required property 'greeting.suffix'",
                Position::new(0, 0),
                Position::new(0, 0),
            ),
            (
                ValidationCode::Expression,
                "Unknown referenced property 'host.name'",
                Position::new(6, 18),
                Position::new(6, 30),
            ),
        ]
    );

    assert_eq!(
        serde_json::to_value(&diagnostics[0]).expect("serializable"),
        json!({
            "range": {
                "start": { "line": 2, "character": 0 },
                "end": { "line": 2, "character": 17 }
            },
            "span": { "start": 36, "end": 53 },
            "severity": "warning",
            "code": "unknown",
            "message": "Unknown property 'quarkus.http.prot'",
            "propertyName": "quarkus.http.prot"
        })
    );
}

#[test]
fn settings_from_json() {
    let settings: ValidationSettings = serde_json::from_value(json!({
        "unknown": { "severity": "hint", "excluded": ["quarkus.http.*"] },
        "expression": { "severity": "none" },
        "required": { "severity": "none" }
    }))
    .expect("settings JSON is well formed");
    assert_eq!(settings.value.severity, Severity::Error);

    let cache = DocumentCache::new();
    cache.open(URI, DOCUMENT, 1);
    let diagnostics = cache
        .with_model(URI, |model| validate(model, &catalog(), &settings, &NeverCancel))
        .expect("document is open")
        .expect("not cancelled");
    let codes: Vec<_> = diagnostics.iter().map(|d| (d.code, d.severity)).collect();
    assert_eq!(
        codes,
        vec![(ValidationCode::Value, Severity::Error), (ValidationCode::Value, Severity::Error)]
    );
}

#[test]
fn fix_a_document() {
    init_tracing();
    let cache = DocumentCache::new();
    cache.open(URI, DOCUMENT, 1);
    let model = cache.get_model(URI).expect("document is open");
    let catalog = catalog();
    let diagnostics =
        validate(&model, &catalog, &ValidationSettings::default(), &NeverCancel).expect("not cancelled");
    let settings: CodeActionSettings =
        serde_json::from_value(json!({ "surroundEqualsWithSpaces": false })).expect("well formed");
    assert_eq!(settings.reserved_roots, vec!["quarkus".to_owned()]);

    let actions = code_actions_for(&diagnostics, &model, &catalog, &settings, &NeverCancel)
        .expect("not cancelled");
    let titles: Vec<_> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Add all missing required properties?",
            "Did you mean 'quarkus.http.port' ?",
            "Exclude 'quarkus.http.prot' from unknown property validation?",
            "Exclude 'quarkus.http.*' from unknown property validation?",
            "Did you mean 'warning'?",
        ]
    );

    let Fix::Edits(edits) = &actions[0].fix else { panic!("expected an insertion") };
    assert_eq!(edits[0].new_text, "\nquarkus.application.name=\ngreeting.suffix=");
    assert_eq!(edits[0].range.start, Position::new(6, 30));
    assert_eq!(actions[0].diagnostics.len(), 2);

    // applying the suggestion and the insertion clears both diagnostics
    let mut fixed = DOCUMENT.replace("quarkus.http.prot", "quarkus.http.port");
    fixed.truncate(fixed.trim_end().len());
    fixed.push_str(&edits[0].new_text.replace('=', "=x"));
    cache.on_change(URI, &fixed, 2).expect("newer version");
    let diagnostics = cache
        .with_model(URI, |model| {
            validate(model, &catalog, &ValidationSettings::default(), &NeverCancel)
        })
        .expect("document is open")
        .expect("not cancelled");
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ValidationCode::Value, ValidationCode::Value, ValidationCode::Expression]
    );
}
