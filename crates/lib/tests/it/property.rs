//! Property descriptor integration tests

use propbag::{Property, PropertyType, Value};
use serde_json::json;

use crate::helpers::*;

fn sample_descriptors() -> Vec<Property> {
    vec![
        Property::default(),
        Property::new("plain"),
        Property::new("port")
            .with_type(PropertyType::Number)
            .with_default(25)
            .with_required(true),
        Property::new("secret")
            .with_type(PropertyType::Password)
            .with_value("hunter2")
            .with_hidden(true)
            .with_readonly(false)
            .with_help("Stored encrypted"),
        Property::new("mode")
            .with_type(PropertyType::List)
            .with_items(vec![Value::from("a"), Value::from("b")])
            .with_group("advanced")
            .with_title("Mode")
            .with_description("Operating mode"),
        Property::new("general")
            .with_type(PropertyType::Group)
            .with_value("general"),
    ]
}

#[test]
fn test_map_round_trip_is_stable() {
    for property in sample_descriptors() {
        let map = property.to_map();
        assert_eq!(Property::from_map(&map).to_map(), map, "{property:?}");
    }
}

#[test]
fn test_from_map_with_json_attributes() {
    let property = Property::from_map(&map(json!({
        "name": "enabled",
        "type": "boolean",
        "value": "true",
        "hidden": 1,
        "required": "false",
        "items": ["ignored", "because", "boolean"],
        "group": null
    })));

    assert_eq!(property.name(), Some("enabled"));
    assert_eq!(property.kind(), PropertyType::Boolean);
    assert_eq!(property.value(), &Value::from("true"));
    assert!(property.is_hidden());
    assert!(!property.is_required());
    assert_eq!(property.items().len(), 3);
    assert_eq!(property.group(), None);
}

#[test]
fn test_from_map_defaults() {
    let property = Property::from_map(&map(json!({})));
    assert_eq!(property, Property::default());
    assert_eq!(property.kind(), PropertyType::Text);
    assert_eq!(property.type_name(), "text");
}

#[test]
fn test_shorthand_example() {
    let property = Property::from_shorthand("name=Color|type=text|required=true").unwrap();
    assert_eq!(property.name(), Some("Color"));
    assert_eq!(property.kind(), PropertyType::Text);
    assert!(property.is_required());
    assert_eq!(property.title(), Some("Color"));
}

#[test]
fn test_shorthand_without_separator_is_parse_error() {
    let err = Property::from_shorthand("name").unwrap_err();
    assert!(err.is_parse_error());

    let err: propbag::Error = err.into();
    assert!(err.is_parse_error());
    assert_eq!(err.module(), "property");
}

#[test]
fn test_shorthand_keeps_equals_inside_values() {
    let property = Property::from_shorthand("name=query|default=a=b").unwrap();
    assert_eq!(property.default_value(), &Value::from("a=b"));
}

#[test]
fn test_group_descriptor() {
    let group = Property::new("mail").with_type(PropertyType::Group);
    assert!(group.is_group());
    assert_eq!(group.to_map().get("type"), Some(&Value::from(9)));
    assert!(!Property::new("host").is_group());
}

#[test]
fn test_builder_leaves_original_untouched() {
    let base = Property::new("host").with_default("localhost");
    let derived = base.clone().with_value("example.org");

    assert_eq!(base.value(), &Value::from("localhost"));
    assert_eq!(derived.value(), &Value::from("example.org"));
}

#[test]
fn test_json_serialization() {
    let property = Property::new("port").with_type(PropertyType::Number).with_default(25);
    let json = serde_json::to_value(&property).unwrap();

    assert_eq!(
        json,
        json!({
            "name": "port",
            "value": 25,
            "title": "port",
            "description": null,
            "default": 25,
            "type": 1,
            "required": false,
            "readonly": false,
            "hidden": false,
            "items": [],
            "group": null,
            "help": null
        })
    );
}
