#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use propsense::{
    CodeActionSettings, Fix, ItemMetadata, MetadataCatalog, Model, NeverCancel, ParseEvent,
    ValidationSettings, code_actions_for, parse, validate,
};

/// Building blocks biased towards the constructs the parser cares about.
#[derive(Debug, Arbitrary)]
enum Piece {
    Text(String),
    Name(u8),
    Profile(u8),
    Assign(bool),
    Space,
    Continuation,
    Newline(u8),
    Comment,
    Expression { name: u8, default: Option<u8>, closed: bool },
    Escape(char),
}

fn render(pieces: &[Piece]) -> String {
    let mut text = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(s) => text.push_str(s),
            Piece::Name(n) => text.push_str(NAMES[usize::from(*n) % NAMES.len()]),
            Piece::Profile(n) => {
                text.push('%');
                text.push_str(["dev", "test", "prod", ""][usize::from(*n) % 4]);
                text.push('.');
            }
            Piece::Assign(eq) => text.push(if *eq { '=' } else { ':' }),
            Piece::Space => text.push(' '),
            Piece::Continuation => text.push_str("\\\n  "),
            Piece::Newline(n) => text.push_str(["\n", "\r\n", "\r"][usize::from(*n) % 3]),
            Piece::Comment => text.push_str("# "),
            Piece::Expression { name, default, closed } => {
                text.push_str("${");
                text.push_str(NAMES[usize::from(*name) % NAMES.len()]);
                if let Some(d) = default {
                    text.push(':');
                    text.push_str(&d.to_string());
                }
                if *closed {
                    text.push('}');
                }
            }
            Piece::Escape(c) => {
                text.push('\\');
                text.push(*c);
            }
        }
    }
    text
}

const NAMES: &[&str] = &["a", "a.b", "quarkus.http.port", "quarkus.http.prot", "x.y.z", "PORT"];

fuzz_target!(|pieces: Vec<Piece>| {
    let text = render(&pieces);

    let mut events = Vec::<ParseEvent>::new();
    parse(&text, &mut events, &NeverCancel).expect("never cancelled");
    let mut again = Vec::<ParseEvent>::new();
    parse(&text, &mut again, &NeverCancel).expect("never cancelled");
    assert_eq!(events, again, "parsing is deterministic");

    let model = Model::parse("file:///fuzz.properties", &text, &NeverCancel).expect("never cancelled");
    if let Err(violation) = model.check_invariants() {
        panic!("{violation}\n{text:?}");
    }

    let catalog = MetadataCatalog::new(
        vec![
            ItemMetadata::new("quarkus.http.port").with_type("int"),
            ItemMetadata::new("x.{*}.z").required(),
            ItemMetadata::new("a.b").required(),
        ],
        vec![],
    );
    let diagnostics = validate(&model, &catalog, &ValidationSettings::default(), &NeverCancel)
        .expect("never cancelled");
    let actions =
        code_actions_for(&diagnostics, &model, &catalog, &CodeActionSettings::default(), &NeverCancel)
            .expect("never cancelled");
    let len = model.buffer().len_chars();
    for diagnostic in &diagnostics {
        assert!(diagnostic.span.end <= len);
    }
    for action in &actions {
        if let Fix::Edits(edits) = &action.fix {
            assert!(edits.iter().all(|edit| edit.span.start <= edit.span.end && edit.span.end <= len));
        }
    }
});
