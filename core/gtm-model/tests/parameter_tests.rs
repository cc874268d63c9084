use gtm_model::{ModelError, Parameter, ParameterType};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Construction from the wire form ─────────────────────────────

#[test]
fn parses_boolean_leaf() {
    let raw = json!({"type": "boolean", "key": "supportDocumentWrite", "value": "false"});
    let p = Parameter::from_value(raw).unwrap();

    assert_eq!(p.kind, ParameterType::Boolean);
    assert_eq!(p.key, "supportDocumentWrite");
    assert_eq!(p.value.as_deref(), Some("false"));
    assert!(p.list.is_empty());
    assert!(p.map.is_empty());
    assert!(p.is_leaf());
    assert_eq!(p.as_bool(), Some(false));
}

#[test]
fn parses_nested_list_into_parameters() {
    let raw = json!({
        "type": "list",
        "key": "fieldsToSet",
        "list": [{"type": "map", "key": "anonymizeIp", "value": "true"}]
    });
    let p = Parameter::from_value(raw).unwrap();

    assert_eq!(p.kind, ParameterType::List);
    assert_eq!(p.children().len(), 1);
    assert_eq!(p.children()[0].key, "anonymizeIp");
    assert!(!p.is_leaf());
}

#[test]
fn unknown_type_is_preserved() {
    let raw = json!({"type": "somethingNew", "key": "k", "value": "v"});
    let p = Parameter::from_value(raw.clone()).unwrap();
    assert_eq!(p.kind, ParameterType::Other("somethingNew".to_string()));
    assert_eq!(p.to_value().unwrap(), raw);
}

#[test]
fn parse_list_rejects_non_sequence() {
    let err = Parameter::parse_list(&json!({"key": "a"})).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    assert!(format!("{err}").contains("'parameter'"));
}

#[test]
fn parse_list_treats_null_as_empty() {
    assert!(Parameter::parse_list(&serde_json::Value::Null).unwrap().is_empty());
}

// ── Wire form ────────────────────────────────────────────────────

#[test]
fn to_value_emits_only_populated_fields() {
    let raw = json!({"type": "boolean", "key": "supportDocumentWrite", "value": "false"});
    let p = Parameter::from_value(raw.clone()).unwrap();
    assert_eq!(p.to_value().unwrap(), raw);
}

#[test]
fn to_value_serializes_children_recursively() {
    let raw = json!({
        "type": "list",
        "key": "fieldsToSet",
        "list": [{"type": "map", "key": "anonymizeIp", "value": "true"}]
    });
    let p = Parameter::from_value(raw.clone()).unwrap();
    assert_eq!(p.to_value().unwrap(), raw);
}

#[test]
fn empty_children_are_omitted() {
    let with_empty =
        Parameter::from_value(json!({"type": "list", "key": "k", "list": []})).unwrap();
    let without = Parameter::from_value(json!({"type": "list", "key": "k"})).unwrap();

    assert_eq!(with_empty, without);
    assert_eq!(with_empty.to_value().unwrap(), json!({"type": "list", "key": "k"}));
}

#[test]
fn empty_string_value_survives() {
    let raw = json!({"type": "template", "key": "html", "value": ""});
    let p = Parameter::from_value(raw.clone()).unwrap();
    assert_eq!(p.to_value().unwrap(), raw);
}

#[test]
fn nested_round_trip_depth_three() {
    let raw = json!({
        "type": "list",
        "key": "dimensions",
        "list": [{
            "type": "map",
            "map": [
                {"type": "template", "key": "index", "value": "1"},
                {"type": "list", "key": "values", "list": [
                    {"type": "template", "value": "a"},
                    {"type": "template", "value": "b"}
                ]}
            ]
        }]
    });
    let p = Parameter::from_value(raw.clone()).unwrap();
    assert_eq!(Parameter::from_value(p.to_value().unwrap()).unwrap(), p);
    assert_eq!(p.to_value().unwrap(), raw);
}

// ── Builders ─────────────────────────────────────────────────────

#[test]
fn builders_produce_expected_wire_form() {
    let p = Parameter::list(
        "fieldsToSet",
        vec![Parameter::map_item(vec![
            Parameter::template("fieldName", "anonymizeIp"),
            Parameter::boolean("value", true),
        ])],
    );

    assert_eq!(
        p.to_value().unwrap(),
        json!({
            "type": "list",
            "key": "fieldsToSet",
            "list": [{
                "type": "map",
                "map": [
                    {"type": "template", "key": "fieldName", "value": "anonymizeIp"},
                    {"type": "boolean", "key": "value", "value": "true"}
                ]
            }]
        })
    );
}

#[test]
fn child_lookup_by_key() {
    let p = Parameter::map(
        "settings",
        vec![Parameter::integer("priority", 5), Parameter::trigger_reference("trigger", "12")],
    );
    assert_eq!(p.child("priority").and_then(|c| c.value.as_deref()), Some("5"));
    assert_eq!(p.child("trigger").map(|c| &c.kind), Some(&ParameterType::TriggerReference));
    assert!(p.child("missing").is_none());
}

#[test]
fn clone_is_deep() {
    let original = Parameter::list("l", vec![Parameter::template("a", "1")]);
    let mut copy = original.clone();
    copy.list[0].value = Some("2".to_string());

    assert_eq!(original.list[0].value.as_deref(), Some("1"));
    assert_eq!(copy.list[0].value.as_deref(), Some("2"));
}

#[test]
fn display_shows_key() {
    let p = Parameter::template("html", "<b>");
    assert_eq!(p.to_string(), "<Parameter html (template)>");
}
