//! End-to-end behavior of the safe serializer on host-shaped values.

use proptest::prelude::*;
use serde_json::{json, Value as Json};

use wiretap::host::HostError;
use wiretap::serialize::walk::MAX_NESTING;
use wiretap::{
    serialize, serialize_with, HostObject, ObjectKind, SafeSerializer, SerializationOptions,
    Value,
};

use super::common::dom;

fn nested_plain(levels: usize) -> Value {
    let mut value = Value::from(1);
    for level in (0..levels).rev() {
        value = Value::object([(format!("l{level}"), value)]);
    }
    value
}

fn wide_plain(keys: usize) -> Value {
    Value::object((0..keys).map(|i| (format!("k{i}"), Value::from(i as f64))))
}

/// Test that an array containing itself gets the root marker
#[test]
fn test_self_reference_in_array_is_marked() {
    let list = HostObject::array([Value::from(1)]);
    list.push(Value::Object(list.clone())).unwrap();

    assert_eq!(serialize(&Value::Object(list)), r#"[1,"[Circular ~]"]"#);
}

/// Test that an object containing itself gets the root marker
#[test]
fn test_self_reference_in_plain_object_is_marked() {
    let object = HostObject::plain();
    object.set("a", Value::from(1)).unwrap();
    object.set("self", Value::Object(object.clone())).unwrap();

    assert_eq!(
        serialize(&Value::Object(object)),
        r#"{"a":1,"self":"[Circular ~]"}"#
    );
}

/// Test that a reference to a nested ancestor names its key path
#[test]
fn test_ancestor_reference_embeds_dotted_path() {
    let a = HostObject::plain();
    let b = HostObject::plain();
    a.set("b", Value::Object(b.clone())).unwrap();
    b.set("back", Value::Object(a.clone())).unwrap();
    let root = Value::object([("a", Value::Object(a))]);

    assert_eq!(
        serialize(&root),
        r#"{"a":{"b":{"back":"[Circular ~.a]"}}}"#
    );
}

/// Test that array indices appear in circular key paths
#[test]
fn test_ancestor_path_through_arrays_uses_indices() {
    let widget = HostObject::builder("Widget", ObjectKind::Other).build();
    let children = HostObject::array([]);
    widget.set("children", Value::Object(children.clone())).unwrap();
    let child = HostObject::builder("Widget", ObjectKind::Other)
        .property("owner", Value::Object(widget.clone()))
        .build();
    children.push(Value::Object(child)).unwrap();
    let root = Value::array([Value::from("first"), Value::Object(widget)]);

    assert_eq!(
        serialize(&root),
        r#"["first",{"children":[{"owner":"[Circular ~.1]"}]}]"#
    );
}

/// Test that one value under two sibling keys is written twice
#[test]
fn test_shared_value_under_sibling_keys_is_not_a_cycle() {
    let shared = Value::object([("k", Value::from(1))]);
    let root = Value::object([("x", shared.clone()), ("y", shared)]);

    assert_eq!(serialize(&root), r#"{"x":{"k":1},"y":{"k":1}}"#);
}

/// Test that objects over the key limit are summarized
#[test]
fn test_key_limit_summarizes_wide_objects() {
    let limit = SerializationOptions::default().key_limit;
    assert_eq!(serialize(&wide_plain(limit + 1)), r#""[object Object]""#);

    let at_limit: Json = serde_json::from_str(&serialize(&wide_plain(limit))).unwrap();
    assert_eq!(at_limit.as_object().map(|m| m.len()), Some(limit));
}

/// Test that objects nested past the depth limit are summarized
#[test]
fn test_depth_limit_summarizes_deep_objects() {
    let limit = SerializationOptions::default().depth_limit;
    assert_eq!(serialize(&nested_plain(limit + 1)), r#""[object Object]""#);
    assert_eq!(
        serialize(&nested_plain(limit)),
        r#"{"l0":{"l1":{"l2":{"l3":1}}}}"#
    );
}

/// Test that the depth limit is checked for nested values as well
#[test]
fn test_depth_limit_applies_below_the_root_too() {
    let options = SerializationOptions::default().with_depth_limit(1);
    let value = Value::array([nested_plain(1), nested_plain(2)]);

    assert_eq!(
        serialize_with(&value, &options),
        r#"[{"l0":1},"[object Object]"]"#
    );
}

/// Test that a huge depth limit is capped by the nesting guard
#[test]
fn test_unbounded_depth_limit_still_summarizes_deep_chains() {
    let options = SerializationOptions::default().with_depth_limit(usize::MAX);
    let chain = nested_plain(MAX_NESTING * 4);

    assert_eq!(serialize_with(&chain, &options), r#""[object Object]""#);
    assert_eq!(
        serialize_with(&nested_plain(3), &options),
        r#"{"l0":{"l1":{"l2":1}}}"#
    );
}

/// Test that summarized strings are cut at the length limit
#[test]
fn test_summarized_strings_respect_length_limit() {
    let chatty = HostObject::builder("Object", ObjectKind::Plain)
        .property("a", Value::from(1))
        .property("b", Value::from(2))
        .to_string_with(|| Ok("abcdefghijklmnopqrstuvwxyz".to_string()))
        .build();
    let options = SerializationOptions::default()
        .with_key_limit(1)
        .with_string_length_limit(5);

    assert_eq!(
        serialize_with(&Value::Object(chatty), &options),
        r#""abcde...""#
    );
}

/// Test that plain string values are never truncated
#[test]
fn test_string_limit_does_not_touch_plain_strings() {
    let options = SerializationOptions::default().with_string_length_limit(3);
    assert_eq!(
        serialize_with(&Value::from("a long string"), &options),
        r#""a long string""#
    );
}

/// Test that functions serialize as their source text
#[test]
fn test_functions_are_summarized_never_expanded() {
    let f = HostObject::function_with_source("handler", "function handler() {}", |_| {
        Ok(Value::Undefined)
    });
    f.set("secret", Value::from("do not expand")).unwrap();
    let root = Value::object([("onClick", Value::Object(f))]);

    assert_eq!(serialize(&root), r#"{"onClick":"function handler() {}"}"#);
}

/// Test that untrusted events with one key collapse to a tag
#[test]
fn test_untrusted_single_key_events_collapse_to_a_tag() {
    let noise = HostObject::event("Event", false).build();
    assert_eq!(serialize(&Value::Object(noise)), r#""[object Event]""#);

    let with_type = HostObject::event("Event", false)
        .property("type", Value::from("scroll"))
        .build();
    assert_eq!(
        serialize(&Value::Object(with_type)),
        r#"{"isTrusted":false,"type":"scroll"}"#
    );

    let trusted = HostObject::event("Event", true).build();
    assert_eq!(serialize(&Value::Object(trusted)), r#"{"isTrusted":true}"#);
}

/// Test that a click event path becomes a selector
#[test]
fn test_click_event_collapses_path_to_selector() {
    let page = dom::page();
    let event = dom::click(&page, &page.first_button);

    insta::assert_snapshot!(
        serialize(&Value::Object(event)),
        @r#"{"isTrusted":true,"type":"click","target":"<button>Save</button>","path":"body>button:eq(0)"}"#
    );
}

/// Test that keys on the event prototype are flattened with own keys
#[test]
fn test_event_flattening_includes_inherited_keys() {
    let page = dom::page();
    let proto = HostObject::builder("MouseEventPrototype", ObjectKind::Plain)
        .property("type", Value::from("click"))
        .property("target", Value::Object(page.second_button.clone()))
        .build();
    let event = HostObject::event("MouseEvent", true).prototype(proto).build();

    assert_eq!(
        serialize(&Value::Object(event)),
        r#"{"isTrusted":true,"type":"click","target":"<button>Cancel</button>"}"#
    );

    let quiet_proto = HostObject::builder("EventPrototype", ObjectKind::Plain)
        .property("type", Value::from("scroll"))
        .build();
    let untrusted = HostObject::event("Event", false).prototype(quiet_proto).build();
    assert_eq!(serialize(&Value::Object(untrusted)), r#""[object Event]""#);
}

/// Test that an empty event path becomes an empty selector
#[test]
fn test_event_with_empty_path_gets_empty_selector() {
    let event = HostObject::event("MouseEvent", true)
        .property("path", Value::array([]))
        .build();
    assert_eq!(
        serialize(&Value::Object(event)),
        r#"{"isTrusted":true,"path":""}"#
    );
}

/// Test that nodes render as markup or node name
#[test]
fn test_nodes_render_markup_or_node_name() {
    let page = dom::page();
    let root = Value::object([
        ("paragraph", Value::Object(page.paragraph.clone())),
        ("text", Value::Object(HostObject::text_node())),
        ("doc", Value::Object(page.document.clone())),
        ("note", Value::Object(HostObject::comment_node())),
        ("bare", Value::Object(HostObject::element("div", None))),
    ]);

    assert_eq!(
        serialize(&root),
        r##"{"paragraph":"<p>hello</p>","text":"#text","doc":"#document","note":"#comment","bare":""}"##
    );
}

/// Test that errors render as name and message
#[test]
fn test_errors_render_name_and_message() {
    let root = Value::object([("err", Value::Object(HostObject::error("TypeError", "x")))]);
    let out = serialize(&root);

    assert!(out.contains("TypeError: x"));
    assert_eq!(out, r#"{"err":"TypeError: x"}"#);
}

/// Test that throwing or panicking host callbacks degrade to markers
#[test]
fn test_hostile_getters_and_conversions_never_escape() {
    let hostile = HostObject::builder("Object", ObjectKind::Plain)
        .getter("throws", || Err(HostError::thrown("Error", "denied")))
        .getter("panics", || panic!("getter exploded"))
        .property("fine", Value::from(true))
        .build();
    assert_eq!(
        serialize(&Value::Object(hostile)),
        r#"{"throws":"[Unreadable]","panics":"[Unreadable]","fine":true}"#
    );

    let bad_to_string = HostObject::builder("Object", ObjectKind::Plain)
        .property("a", Value::from(1))
        .property("b", Value::from(2))
        .to_string_with(|| panic!("toString exploded"))
        .build();
    let options = SerializationOptions::default().with_key_limit(1);
    assert_eq!(
        serialize_with(&Value::Object(bad_to_string), &options),
        r#""""#
    );
}

/// Test that a nested serialize call does not disturb the outer one
#[test]
fn test_reentrant_serialization_keeps_frames_separate() {
    let inner = Value::object([("x", Value::from(1))]);
    let nested_call = HostObject::builder("Object", ObjectKind::Plain)
        .property("a", Value::from(1))
        .property("b", Value::from(2))
        .to_string_with(move || Ok(serialize(&inner)))
        .build();
    let looped = HostObject::array([]);
    looped.push(Value::Object(looped.clone())).unwrap();
    let root = Value::array([Value::Object(nested_call), Value::Object(looped)]);

    let serializer = SafeSerializer::new(SerializationOptions::default().with_key_limit(1));
    assert_eq!(
        serializer.serialize(&root),
        r#"["{\"x\":1}",["[Circular ~.1]"]]"#
    );
}

/// Test that the JSON tree and the string output agree
#[test]
fn test_to_json_matches_serialize() {
    let page = dom::page();
    let event = Value::Object(dom::click(&page, &page.second_button));
    let serializer = SafeSerializer::new(SerializationOptions::default());

    let tree = serializer.to_json(&event).unwrap();
    assert_eq!(tree["path"], json!("body>button:eq(1)"));
    assert_eq!(serde_json::to_string(&tree).unwrap(), serializer.serialize(&event));
}

/// Test that fractional numbers parse back to the exact same float
#[test]
fn test_fractional_numbers_parse_back_exactly() {
    for n in [1.1168635016616009e-175, 0.1 + 0.2, -2.5e300, 5e-324] {
        let out = serialize(&Value::object([("a", Value::from(n))]));
        let parsed: Json = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["a"].as_f64(), Some(n), "{out}");
    }
}

fn json_leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        any::<f64>()
            .prop_filter("finite, fractional", |f| f.is_finite() && f.fract() != 0.0)
            .prop_map(|f| json!(f)),
        ".{0,12}".prop_map(Json::String),
    ]
}

fn json_document() -> impl Strategy<Value = Json> {
    json_leaf().prop_recursive(3, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|map| Json::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Test that in-bounds acyclic documents round-trip through a parser
    #[test]
    fn test_shallow_primitive_documents_round_trip(document in json_document()) {
        let out = serialize(&Value::from(document.clone()));
        let parsed: Json = serde_json::from_str(&out).unwrap();
        prop_assert_eq!(parsed, document);
    }
}
