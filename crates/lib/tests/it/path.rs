//! Path integration tests
//!
//! Covers text and pre-split paths, read-only traversal, structural writes and
//! the error values reported when a write would pass through a scalar.

use propbag::{KeyPath, Map, PathError, Value, path};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_get_after_set_multi_segment() {
    let mut root = Map::new();
    for (text, value) in [
        ("a", Value::from(1)),
        ("b/c", Value::from("x")),
        ("d/e/f/g", Value::from(true)),
    ] {
        path::set(&mut root, text, value.clone()).unwrap();
        assert_eq!(path::get(&root, text), Some(&value));
    }
}

#[test]
fn test_get_never_creates_nodes() {
    let root = map(json!({ "a": { "b": 1 } }));
    let before = root.clone();

    assert_eq!(path::get(&root, "a/x/y"), None);
    assert_eq!(path::get(&root, "z"), None);
    assert_eq!(root, before);
}

#[test]
fn test_get_through_lists_by_index() {
    let root = map(json!({ "servers": [ { "host": "a" }, { "host": "b" } ] }));
    assert_eq!(path::get(&root, "servers/1/host"), Some(&Value::from("b")));
    assert_eq!(path::get(&root, "servers/2/host"), None);
    assert_eq!(path::get(&root, "servers/first/host"), None);
}

#[test]
fn test_presplit_and_text_paths_agree() {
    let root = map(json!({ "a": { "b": { "c": 7 } } }));
    let expected = Some(&Value::from(7));

    assert_eq!(path::get(&root, "a/b/c"), expected);
    assert_eq!(path::get(&root, ["a", "b", "c"]), expected);
    assert_eq!(path::get(&root, vec!["a".to_string(), "b".to_string(), "c".to_string()]), expected);
    assert_eq!(path::get(&root, KeyPath::parse("a.b.c", '.')), expected);
}

#[test]
fn test_set_returns_previous_value() {
    let mut root = Map::new();
    assert_eq!(path::set(&mut root, "a/b", 1).unwrap(), None);
    assert_eq!(path::set(&mut root, "a/b", 2).unwrap(), Some(Value::from(1)));
}

#[test]
fn test_set_replaces_null_intermediates() {
    let mut root = map(json!({ "a": null }));
    path::set(&mut root, "a/b", "x").unwrap();
    assert_eq!(Value::Map(root), value(json!({ "a": { "b": "x" } })));
}

#[test]
fn test_set_through_scalar_fails_without_mutation() {
    let mut root = map(json!({ "a": { "b": 5 } }));
    let before = root.clone();

    let err = path::set(&mut root, "a/b/c", 1).unwrap_err();
    assert!(matches!(err, PathError::NotAMap { found: "int", .. }), "{err:?}");
    assert_eq!(err.segment(), "c");
    assert_eq!(err.path(), "a/b/c");
    assert_eq!(root, before);
}

#[test]
fn test_set_with_bad_list_index_fails() {
    let mut root = map(json!({ "items": [1, 2] }));
    let err = path::set(&mut root, "items/5", 3).unwrap_err();
    assert!(matches!(err, PathError::IndexOutOfBounds { len: 2, .. }), "{err:?}");

    path::set(&mut root, "items/1", 3).unwrap();
    assert_eq!(path::get(&root, "items"), Some(&value(json!([1, 3]))));
}

#[test]
fn test_empty_path_is_a_noop() {
    let mut root = map(json!({ "a": 1 }));
    assert_eq!(path::set(&mut root, "", 2).unwrap(), None);
    assert_eq!(path::get(&root, ""), None);
    assert_eq!(root.len(), 1);
}

#[test]
fn test_remove_nested() {
    let mut root = map(json!({ "a": { "b": 1, "c": 2 }, "list": [1, 2, 3] }));
    assert_eq!(path::remove(&mut root, "a/b"), Some(Value::from(1)));
    assert_eq!(path::remove(&mut root, "a/b"), None);
    assert_eq!(path::remove(&mut root, "list/0"), Some(Value::from(1)));
    assert_eq!(Value::Map(root), value(json!({ "a": { "c": 2 }, "list": [2, 3] })));
}

#[test]
fn test_key_path_helpers() {
    let path = KeyPath::parse("a/b/c", '/');
    assert_eq!(path.len(), 3);
    assert_eq!(path.last(), Some("c"));
    assert_eq!(path.parent(), Some(KeyPath::parse("a/b", '/')));
    assert_eq!(path.join_with('.'), "a.b.c");
    assert_eq!(path.to_string(), "a/b/c");
    assert!(KeyPath::parse("", '/').is_empty());
}
