use insta::assert_yaml_snapshot;
use quickcheck::QuickCheck;
use rstest::rstest;

use super::{builder::test_support::truncated, *};
use crate::{cancel::NeverCancel, parser::PropertiesHandler};

fn parse_model(text: &str) -> Model {
    Model::parse("file:///application.properties", text, &NeverCancel).expect("never cancelled")
}

#[derive(serde::Serialize)]
struct Outline {
    kind: NodeKind,
    start: Option<usize>,
    end: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Outline>,
}

fn outline(node: Node<'_>) -> Outline {
    Outline {
        kind: node.kind(),
        start: node.start(),
        end: node.end(),
        children: node.children().map(outline).collect(),
    }
}

#[test]
fn snapshot_tree() {
    let model = parse_model("# c\n%dev.a = x${y:1}\n");
    assert_yaml_snapshot!(outline(model.document()), @r"
    kind: Document
    start: 0
    end: 21
    children:
      - kind: Comment
        start: 0
        end: 3
      - kind: Property
        start: 4
        end: 20
        children:
          - kind: PropertyKey
            start: 4
            end: 10
          - kind: Assign
            start: 11
            end: 12
          - kind: PropertyValue
            start: 13
            end: 20
            children:
              - kind: PropertyValueLiteral
                start: 13
                end: 14
              - kind: PropertyValueExpression
                start: 14
                end: 20
    ");
}

#[test]
fn continued_key_has_logical_name() {
    let model = parse_model("a.\\\nb=1");
    let properties: Vec<_> = model.properties().collect();
    assert_eq!(properties.len(), 1);
    let property = properties[0];
    assert_eq!(property.property_name(), "a.b");
    assert_eq!(property.property_value().as_deref(), Some("1"));
    let key = property.key().unwrap();
    assert_eq!(key.node().text(false).as_deref(), Some("a.\\\nb"));
}

#[test]
fn spans_reconstruct_multiline_sources() {
    let model = parse_model("a.\\\n  b = x${y}z\\\n  w");
    let property = model.properties().next().unwrap();
    let key = property.key().unwrap().node();
    let value = property.value().unwrap();

    assert_eq!(key.span(), Some(Span::new(0, 7)));
    assert_eq!(key.text(false).as_deref(), Some("a.\\\n  b"));
    assert_eq!(key.text(true).as_deref(), Some("a.b"));
    assert_eq!(property.assign().and_then(Node::span), Some(Span::new(8, 9)));
    assert_eq!(value.node().text(false).as_deref(), Some("x${y}z\\\n  w"));
    assert_eq!(value.value().as_deref(), Some("x${y}zw"));

    let fragments: Vec<_> = value
        .fragments()
        .map(|node| (node.kind(), node.text(false).unwrap().into_owned()))
        .collect();
    assert_eq!(
        fragments,
        vec![
            (NodeKind::PropertyValueLiteral, "x".to_owned()),
            (NodeKind::PropertyValueExpression, "${y}".to_owned()),
            (NodeKind::PropertyValueLiteral, "z\\\n  w".to_owned()),
        ]
    );
}

#[test]
fn multiline_text_keeps_interior_whitespace_and_other_escapes() {
    let model = parse_model("k=one \\\r\n   two\\tthree");
    assert_eq!(
        model.properties().next().unwrap().property_value().as_deref(),
        Some("one two\\tthree")
    );
}

#[rstest]
#[case("%dev.quarkus.http.port=8080", Some("dev"), "quarkus.http.port")]
#[case("quarkus.http.port=8080", None, "quarkus.http.port")]
#[case("%dev=1", Some("dev"), "")]
#[case("%.a=1", Some(""), "a")]
fn profiles(#[case] text: &str, #[case] profile: Option<&str>, #[case] name: &str) {
    let model = parse_model(text);
    let property = model.properties().next().unwrap();
    assert_eq!(property.profile(), profile);
    assert_eq!(property.property_name(), name);
    assert_eq!(
        property.property_name_with_profile().as_deref(),
        Some(&text[..text.find('=').unwrap()])
    );
}

#[test]
fn offsets_inside_profile_prefix() {
    let model = parse_model("%dev.a=1");
    let key = model.properties().next().unwrap().key().unwrap();
    assert!(key.is_before_profile(0));
    assert!(key.is_before_profile(4));
    assert!(!key.is_before_profile(5));

    let model = parse_model("a=1");
    assert!(!model.properties().next().unwrap().key().unwrap().is_before_profile(0));
}

#[rstest]
#[case("key = value", 0, NodeKind::PropertyKey)]
#[case("key = value", 3, NodeKind::PropertyKey)]
#[case("key = value", 4, NodeKind::Assign)]
#[case("key = value", 5, NodeKind::Assign)]
#[case("key = value", 6, NodeKind::PropertyValueLiteral)]
#[case("key = value", 11, NodeKind::PropertyValueLiteral)]
#[case("key rest", 6, NodeKind::PropertyKey)]
#[case("a=x${y}", 5, NodeKind::PropertyValueExpression)]
#[case("a=1\n\nb=2", 4, NodeKind::Document)]
#[case("# note\na=1", 2, NodeKind::Comment)]
fn find_node_at(#[case] text: &str, #[case] offset: usize, #[case] expected: NodeKind) {
    assert_eq!(parse_model(text).find_node_at(offset).kind(), expected);
}

#[test]
fn keys_skip_blank_values() {
    let model = parse_model("a=1\nb=\nc=  \n%dev.d=x\ne");
    let mut keys: Vec<_> = model.keys().iter().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["%dev.d".to_owned(), "a".to_owned()]);
    assert!(model.has_key("a"));
    assert!(!model.has_key("b"));
    assert_eq!(model.properties().count(), 5);
}

#[rstest]
#[case::plain("a", Some("1"))]
#[case::profile("%dev.a", Some("dev one"))]
#[case::continuation("c", Some("xy"))]
#[case::blank_then_set("b", Some("2"))]
#[case::only_blank("d", None)]
#[case::missing("z", None)]
#[case::name_without_profile_is_not_a_match("dev.a", None)]
fn value_lookup(#[case] key: &str, #[case] expected: Option<&str>) {
    let model = parse_model("a=1\n%dev.a = dev one\nb=\nb=2\nb=3\nc=x\\\n  y\nd=  \ne");
    assert_eq!(model.value(key).as_deref(), expected);
}

#[test]
fn comment_after_continuation_is_a_comment() {
    let model = parse_model("a=1\\\n# c\nb=2");
    let kinds: Vec<_> = model.document().children().map(|node| node.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Property, NodeKind::Comment, NodeKind::Property]);
    assert_eq!(model.value("a").as_deref(), Some("1"));
    assert_eq!(model.value("b").as_deref(), Some("2"));
}

#[test]
fn expression_accessors() {
    let model = parse_model("a=${b.c:def}${open\nx=$y");
    let mut properties = model.properties();

    let expressions: Vec<_> = properties.next().unwrap().value().unwrap().expressions().collect();
    assert_eq!(expressions.len(), 2);
    assert!(expressions[0].is_closed());
    assert_eq!(expressions[0].reference_name().as_deref(), Some("b.c"));
    assert_eq!(expressions[0].default_value().as_deref(), Some("def"));
    assert!(!expressions[1].is_closed());
    assert_eq!(expressions[1].reference_name().as_deref(), Some("open"));
    assert_eq!(expressions[1].default_value(), None);

    let bare = properties.next().unwrap();
    assert!(bare.is_value_expression());
    let bare = bare.value().unwrap().expressions().next().unwrap();
    assert!(!bare.is_closed());
    assert_eq!(bare.reference_name(), None);
}

#[test]
fn unclosed_nodes_answer_empty() {
    let model = truncated("abc", |handler| {
        handler.start_document(0);
        handler.start_property(0);
        handler.start_property_name(0);
    });
    let property = model.properties().next().unwrap();
    assert_eq!(property.node().span(), None);
    assert_eq!(property.property_name(), "");
    assert_eq!(property.property_name_with_profile(), None);
    assert_eq!(property.profile(), None);
    assert_eq!(property.property_value(), None);
    assert_eq!(model.find_node_at(1).kind(), NodeKind::Document);
    assert!(model.keys().is_empty());
    assert!(model.check_invariants().is_err());
}

#[test]
fn parse_errors_do_not_prevent_a_model() {
    let model = parse_model("a=\u{1}\nb=2");
    assert_eq!(model.parse_errors().len(), 1);
    assert_eq!(model.properties().count(), 2);
    assert!(model.check_invariants().is_ok());
}

#[test]
fn cancelled_parse_has_no_model() {
    let result = Model::parse("file:///a.properties", "a=1\nb=2", &|| true);
    assert_eq!(result.err(), Some(Cancelled));
}

#[test]
fn text_out_of_bounds_is_none() {
    let model = parse_model("a=1");
    assert_eq!(model.text(2, 4, true), None);
    assert_eq!(model.text(2, 1, false), None);
    assert!(model.node(NodeId(99)).is_none());
}

/// Property: any input yields a tree whose spans nest and order correctly,
/// and parsing twice yields the same structure.
#[test]
fn trees_are_well_formed_and_stable_quickcheck() {
    fn shape(model: &Model) -> Vec<(NodeKind, Option<usize>, Option<usize>, Option<NodeId>)> {
        model.nodes.iter().map(|n| (n.kind, n.start, n.end, n.parent)).collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String) -> bool {
        let first = parse_model(&text);
        first.check_invariants().is_ok() && shape(&first) == shape(&parse_model(&text))
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new().tests(tests).quickcheck(prop as fn(String) -> bool);
}
