use indexmap::IndexMap;
use serde_json::json;
use std::collections::HashMap;
use template_sandbox::{
    build_context, expose::Expose, Error, RenderInput, SafeValue, ToSafe,
};
use test_log::test;

mod utils;
use utils::{sample_order, Connection, Customer};

#[test]
fn mapping_input_keeps_every_key_and_nothing_else() {
    let mut data: HashMap<String, Box<dyn ToSafe>> = HashMap::new();
    data.insert("name".into(), Box::new("Ada".to_string()));
    data.insert("visits".into(), Box::new(12u32));
    data.insert("vip".into(), Box::new(true));
    data.insert("nickname".into(), Box::new(None::<String>));

    let vars = build_context(RenderInput::mapping(&data)).unwrap();

    assert_eq!(vars.len(), data.len());
    for (key, value) in &data {
        assert_eq!(vars.get(key), Some(&value.to_safe()), "value for '{key}'");
    }
}

#[test]
fn mapping_input_preserves_insertion_order() {
    let mut data: IndexMap<String, i64> = IndexMap::new();
    for (i, key) in ["zeta", "alpha", "mid"].iter().enumerate() {
        data.insert(key.to_string(), i as i64);
    }
    let vars = build_context(RenderInput::mapping(&data)).unwrap();
    assert_eq!(vars.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
}

#[test]
fn object_input_yields_exactly_its_exposed_members() {
    let order = sample_order();
    let vars = build_context(RenderInput::object(&order)).unwrap();
    assert_eq!(
        vars.keys().collect::<Vec<_>>(),
        ["number", "created_at", "customer", "lines", "total"]
    );
    assert!(!vars.contains_key("connection"));
}

#[test]
fn nested_records_hide_unlisted_members() {
    let order = sample_order();
    let vars = build_context(RenderInput::object(&order)).unwrap();
    let customer = vars.get("customer").and_then(SafeValue::as_record).unwrap();

    assert_eq!(customer.field_names().collect::<Vec<_>>(), ["name", "email", "address"]);
    assert!(customer.get("password_hash").is_none());
    assert!(customer.get("deleted").is_none());
    assert!(customer.get("delete").is_none());
}

#[test]
fn building_a_context_never_mutates_the_input() {
    let customer = Customer::new("Bo");
    build_context(RenderInput::object(&customer)).unwrap();
    assert!(!customer.deleted.get());
    customer.delete();
    assert!(customer.deleted.get());
}

#[test]
fn members_without_readable_fields_become_opaque_markers() {
    let mut data: HashMap<String, Box<dyn Expose>> = HashMap::new();
    data.insert("db".into(), Box::new(Connection { dsn: "postgres://shop".into() }));

    let vars = build_context(RenderInput::mapping(&data)).unwrap();
    assert_eq!(vars.get("db"), Some(&SafeValue::Opaque("Connection".into())));
}

#[test]
fn converting_safe_values_is_idempotent() {
    let order = sample_order();
    let once = build_context(RenderInput::object(&order)).unwrap();
    let mut again: IndexMap<String, SafeValue> = IndexMap::new();
    for (key, value) in &once {
        again.insert(key.clone(), value.to_safe());
    }
    let twice = build_context(RenderInput::mapping(&again)).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn dates_are_admitted_as_dates() {
    let order = sample_order();
    let vars = build_context(RenderInput::object(&order)).unwrap();
    match vars.get("created_at") {
        Some(SafeValue::DateTime(dt)) => assert_eq!(dt.to_rfc3339(), "2024-03-09T14:05:00+00:00"),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn context_serializes_for_diagnostics() {
    let order = sample_order();
    let vars = build_context(RenderInput::object(&order)).unwrap();
    let dumped = serde_json::to_value(&vars).unwrap();
    assert_eq!(dumped["customer"]["address"], json!({"city": "Oslo", "country": "NO"}));
    assert_eq!(dumped["lines"][1]["sku"], json!("TEE-3"));
    assert!(dumped["customer"].get("password_hash").is_none());
}

#[test]
fn missing_input_is_an_invalid_argument() {
    let err = build_context(RenderInput::Missing).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { name: "data", .. }));
}
