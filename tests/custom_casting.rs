//! End-to-end casting behaviour through `GenericModel`.

use cast_kit::{
    CastValue, CastWrite, Caster, CasterRegistry, CastsAttributes, Error, GenericModel, Model,
    ModelDefinition, RawAttributes, Result,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Address {
    line_one: Option<String>,
    line_two: Option<String>,
}

#[derive(Default)]
struct ReverseCaster;

impl CastsAttributes for ReverseCaster {
    fn get(
        &self,
        _model: &dyn Model,
        _key: &str,
        value: &Value,
        _attributes: &RawAttributes,
    ) -> Result<CastValue> {
        let text = value.as_str().unwrap_or_default();
        Ok(CastValue::new(text.chars().rev().collect::<String>()))
    }

    fn set(
        &self,
        _model: &dyn Model,
        key: &str,
        value: &CastValue,
        _attributes: &RawAttributes,
    ) -> Result<CastWrite> {
        let text = value.as_str().unwrap_or_default();
        Ok(RawAttributes::single(key, json!(text.chars().rev().collect::<String>())).into())
    }
}

#[derive(Default)]
struct AddressCaster;

impl CastsAttributes for AddressCaster {
    fn get(
        &self,
        _model: &dyn Model,
        _key: &str,
        _value: &Value,
        attributes: &RawAttributes,
    ) -> Result<CastValue> {
        Ok(CastValue::new(Address {
            line_one: attributes.str("address_line_one").map(str::to_string),
            line_two: attributes.str("address_line_two").map(str::to_string),
        }))
    }

    fn set(
        &self,
        _model: &dyn Model,
        _key: &str,
        value: &CastValue,
        _attributes: &RawAttributes,
    ) -> Result<CastWrite> {
        let (one, two) = if value.is_null() {
            (Value::Null, Value::Null)
        } else {
            let address = value
                .downcast_ref::<Address>()
                .ok_or_else(|| Error::ValidationError("expected an Address".to_string()))?;
            (json!(address.line_one), json!(address.line_two))
        };

        Ok(CastWrite::Attributes(
            [("address_line_one", one), ("address_line_two", two)]
                .into_iter()
                .collect(),
        ))
    }
}

struct CustomCastModel;

impl ModelDefinition for CustomCastModel {
    fn model_name() -> &'static str {
        "custom_cast_model"
    }

    fn casts() -> &'static [(&'static str, &'static str)] {
        &[
            ("address", "AddressCaster"),
            ("password", "HashCaster"),
            ("other_password", "HashCaster:md5"),
            ("reversed", "ReverseCaster"),
            ("options", "JsonCaster"),
        ]
    }
}

fn registry() -> Arc<CasterRegistry> {
    let _ = env_logger::builder().is_test(true).try_init();

    Arc::new(
        CasterRegistry::builder()
            .with_builtins()
            .register_default::<ReverseCaster>("ReverseCaster")
            .register("AddressCaster", |_: &[String]| {
                Ok(Caster::bidirectional(AddressCaster))
            })
            .build(),
    )
}

fn new_model() -> GenericModel<CustomCastModel> {
    GenericModel::new(registry())
}

fn address_attributes(line_one: &str, line_two: &str) -> RawAttributes {
    [
        ("address_line_one", json!(line_one)),
        ("address_line_two", json!(line_two)),
    ]
    .into_iter()
    .collect()
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[test]
fn test_basic_custom_casting() {
    let mut model = new_model();
    model
        .set_cast_attribute("reversed", "taylor")
        .expect("Failed to set");

    let reversed = model.get_cast_attribute("reversed").expect("Failed to get");
    assert_eq!(reversed.as_str(), Some("taylor"));
    assert_eq!(model.attributes().str("reversed"), Some("rolyat"));
    assert_eq!(model.to_array().str("reversed"), Some("rolyat"));
}

#[test]
fn test_snapshot_round_trip() {
    let mut model = new_model();
    model
        .set_cast_attribute("reversed", "taylor")
        .expect("Failed to set");
    model.get_cast_attribute("reversed").expect("Failed to get");

    let bytes = model.snapshot().expect("Failed to snapshot");
    let mut restored =
        GenericModel::<CustomCastModel>::restore(&bytes, registry()).expect("Failed to restore");

    assert!(!restored.is_cached("reversed"));
    assert_eq!(restored.attributes(), model.attributes());

    let reversed = restored
        .get_cast_attribute("reversed")
        .expect("Failed to get");
    assert_eq!(reversed.as_str(), Some("taylor"));
    assert!(restored.is_cached("reversed"));
    assert_eq!(restored.attributes().str("reversed"), Some("rolyat"));
    assert_eq!(restored.to_array().str("reversed"), Some("rolyat"));
}

#[test]
fn test_multi_key_attribute_reads_constituent_keys() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));

    let address = model
        .get_cast_attribute("address")
        .expect("Failed to get")
        .downcast::<Address>()
        .expect("Address payload");

    assert_eq!(address.line_one.as_deref(), Some("110 Kingsbrook St."));
    assert_eq!(address.line_two.as_deref(), Some("My House"));

    let array = model.to_array();
    assert_eq!(array.str("address_line_one"), Some("110 Kingsbrook St."));
    assert_eq!(array.str("address_line_two"), Some("My House"));
}

#[test]
fn test_multi_key_write_and_serialized_views() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));

    let mut address = (*model
        .get_cast_attribute("address")
        .expect("Failed to get")
        .downcast::<Address>()
        .expect("Address payload"))
    .clone();
    address.line_one = Some("117 Spencer St.".to_string());
    model
        .set_cast_attribute("address", CastValue::new(address))
        .expect("Failed to set");

    let array = model.to_array();
    assert!(!array.contains_key("address"));
    assert_eq!(array.str("address_line_one"), Some("117 Spencer St."));
    assert_eq!(array.str("address_line_two"), Some("My House"));

    let decoded: Value =
        serde_json::from_str(&model.to_json().expect("Failed to encode")).expect("Invalid JSON");
    assert!(decoded.get("address").is_none());
    assert_eq!(decoded["address_line_one"], json!("117 Spencer St."));
    assert_eq!(decoded["address_line_two"], json!("My House"));
}

#[test]
fn test_mutating_a_read_value_does_not_touch_raw_storage() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));

    let read = model
        .get_cast_attribute("address")
        .expect("Failed to get")
        .downcast::<Address>()
        .expect("Address payload");
    let mut edited = (*read).clone();
    edited.line_one = Some("117 Spencer St.".to_string());

    assert_eq!(
        model.to_array().str("address_line_one"),
        Some("110 Kingsbrook St.")
    );

    model
        .set_cast_attribute("address", CastValue::new(edited))
        .expect("Failed to set");
    assert_eq!(
        model.to_array().str("address_line_one"),
        Some("117 Spencer St.")
    );
}

#[test]
fn test_setting_multi_key_attribute_to_null() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));

    model
        .set_cast_attribute("address", CastValue::null())
        .expect("Failed to set");

    let array = model.to_array();
    assert_eq!(array.get("address_line_one"), Some(&Value::Null));
    assert_eq!(array.get("address_line_two"), Some(&Value::Null));
    assert!(!array.contains_key("address"));
}

#[test]
fn test_multi_key_write_refreshes_cached_value() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));
    let before = model.get_cast_attribute("address").expect("Failed to get");

    model
        .set_cast_attribute(
            "address",
            CastValue::new(Address {
                line_one: Some("1 Infinite Loop".to_string()),
                line_two: None,
            }),
        )
        .expect("Failed to set");

    let after = model.get_cast_attribute("address").expect("Failed to get");
    assert!(!CastValue::ptr_eq(&before, &after));
    assert_eq!(
        after.downcast_ref::<Address>(),
        Some(&Address {
            line_one: Some("1 Infinite Loop".to_string()),
            line_two: None,
        })
    );
}

#[test]
fn test_raw_write_to_backing_key_refreshes_multi_key_value() {
    let mut model = new_model();
    model
        .set_cast_attribute(
            "address",
            CastValue::new(Address {
                line_one: Some("110 Kingsbrook St.".to_string()),
                line_two: Some("My House".to_string()),
            }),
        )
        .expect("Failed to set");
    model.get_cast_attribute("address").expect("Failed to get");

    model.set_raw_attribute("address_line_two", json!("Your House"));

    assert!(!model.is_cached("address"));
    let address = model.get_cast_attribute("address").expect("Failed to get");
    assert_eq!(
        address
            .downcast_ref::<Address>()
            .and_then(|a| a.line_two.as_deref()),
        Some("Your House")
    );
}

#[test]
fn test_raw_write_after_hydration_refreshes_multi_key_value() {
    let mut model = GenericModel::<CustomCastModel>::with_attributes(
        registry(),
        RawAttributes::single("address_line_one", json!("110 Kingsbrook St.")),
    );
    model.get_cast_attribute("address").expect("Failed to get");

    model.set_raw_attribute("address_line_one", json!("117 Spencer St."));

    assert!(!model.is_cached("address"));
    let address = model.get_cast_attribute("address").expect("Failed to get");
    assert_eq!(
        address
            .downcast_ref::<Address>()
            .and_then(|a| a.line_one.as_deref()),
        Some("117 Spencer St.")
    );
}

#[test]
fn test_raw_write_after_restore_refreshes_multi_key_value() {
    let mut model = new_model();
    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));
    let bytes = model.snapshot().expect("Failed to snapshot");

    let mut restored =
        GenericModel::<CustomCastModel>::restore(&bytes, registry()).expect("Failed to restore");
    restored.get_cast_attribute("address").expect("Failed to get");
    restored
        .set_cast_attribute("reversed", "taylor")
        .expect("Failed to set");
    restored.get_cast_attribute("address").expect("Failed to get");

    restored.set_raw_attribute("address_line_two", json!("Your House"));

    let address = restored.get_cast_attribute("address").expect("Failed to get");
    assert_eq!(
        address
            .downcast_ref::<Address>()
            .and_then(|a| a.line_two.as_deref()),
        Some("Your House")
    );
}

#[test]
fn test_stray_raw_key_is_hidden_for_multi_key_attribute() {
    let mut model = new_model();
    model
        .set_cast_attribute(
            "address",
            CastValue::new(Address {
                line_one: Some("110 Kingsbrook St.".to_string()),
                line_two: None,
            }),
        )
        .expect("Failed to set");
    model.set_raw_attribute("address", json!("stray"));

    assert_eq!(model.raw_attribute("address"), Some(&json!("stray")));
    assert!(!model.to_array().contains_key("address"));
    assert_eq!(
        model.to_array().str("address_line_one"),
        Some("110 Kingsbrook St.")
    );

    let decoded: Value =
        serde_json::from_str(&model.to_json().expect("Failed to encode")).expect("Invalid JSON");
    assert!(decoded.get("address").is_none());
    assert_eq!(decoded["address_line_one"], json!("110 Kingsbrook St."));

    let bytes = model.snapshot().expect("Failed to snapshot");
    let restored =
        GenericModel::<CustomCastModel>::restore(&bytes, registry()).expect("Failed to restore");
    assert_eq!(restored.raw_attribute("address"), Some(&json!("stray")));
    assert!(!restored.to_array().contains_key("address"));
    assert_eq!(
        restored.to_array().str("address_line_one"),
        Some("110 Kingsbrook St.")
    );
}

#[test]
fn test_json_options_are_cached_between_writes() {
    let mut model = new_model();

    model
        .set_cast_attribute("options", json!({"foo": "bar"}))
        .expect("Failed to set");
    let first = model.get_cast_attribute("options").expect("Failed to get");
    let second = model.get_cast_attribute("options").expect("Failed to get");
    assert_eq!(first.downcast_ref::<Value>(), Some(&json!({"foo": "bar"})));
    assert!(CastValue::ptr_eq(&first, &second));

    model
        .set_cast_attribute("options", json!({"foo": "bar"}))
        .expect("Failed to set");
    model
        .set_cast_attribute("options", json!({"foo": "bar"}))
        .expect("Failed to set");
    let third = model.get_cast_attribute("options").expect("Failed to get");
    let fourth = model.get_cast_attribute("options").expect("Failed to get");
    assert_eq!(third.downcast_ref::<Value>(), Some(&json!({"foo": "bar"})));
    assert!(CastValue::ptr_eq(&third, &fourth));

    assert_eq!(model.attributes().str("options"), Some(r#"{"foo":"bar"}"#));
}

#[test]
fn test_one_way_casting() {
    let mut model = new_model();

    model
        .set_cast_attribute("password", "secret")
        .expect("Failed to set");

    let expected = sha256_hex("secret");
    assert_eq!(
        expected,
        "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
    );
    for _ in 0..2 {
        let password = model.get_cast_attribute("password").expect("Failed to get");
        assert_eq!(password.as_str(), Some(expected.as_str()));
        assert_eq!(model.attributes().str("password"), Some(expected.as_str()));
    }

    model
        .set_cast_attribute("password", "secret2")
        .expect("Failed to set");

    let expected = sha256_hex("secret2");
    for _ in 0..2 {
        let password = model.get_cast_attribute("password").expect("Failed to get");
        assert_eq!(password.as_str(), Some(expected.as_str()));
        assert_eq!(model.attributes().str("password"), Some(expected.as_str()));
    }
}

#[test]
fn test_one_way_writes_are_deterministic() {
    let mut model = new_model();

    model
        .set_cast_attribute("password", "secret")
        .expect("Failed to set");
    let first = model.attributes().clone();
    model
        .set_cast_attribute("password", "secret")
        .expect("Failed to set");

    assert_eq!(model.attributes(), &first);
}

#[test]
fn test_cast_class_resolution() {
    let mut model = new_model();

    model
        .set_cast_attribute("other_password", "secret")
        .expect("Failed to set");
    let value = model
        .get_cast_attribute("other_password")
        .expect("Failed to get");
    assert_eq!(value.as_str(), Some("5ebe2294ecd0e0f08eab7690d2a6ee69"));
    assert_eq!(value.as_str(), Some(md5_hex("secret").as_str()));

    model
        .set_cast_attribute("other_password", "secret2")
        .expect("Failed to set");
    let value = model
        .get_cast_attribute("other_password")
        .expect("Failed to get");
    assert_eq!(value.as_str(), Some(md5_hex("secret2").as_str()));
}

#[test]
fn test_setting_raw_attributes_clears_the_cast_cache() {
    let mut model = new_model();

    model.set_raw_attributes(address_attributes("110 Kingsbrook St.", "My House"));
    let address = model.get_cast_attribute("address").expect("Failed to get");
    assert_eq!(
        address
            .downcast_ref::<Address>()
            .and_then(|a| a.line_one.as_deref()),
        Some("110 Kingsbrook St.")
    );

    model.set_raw_attributes(address_attributes("117 Spencer St.", "My House"));
    let address = model.get_cast_attribute("address").expect("Failed to get");
    assert_eq!(
        address
            .downcast_ref::<Address>()
            .and_then(|a| a.line_one.as_deref()),
        Some("117 Spencer St.")
    );
}

#[test]
fn test_casters_are_shared_across_instances() {
    let registry = registry();
    let mut first = GenericModel::<CustomCastModel>::new(Arc::clone(&registry));
    let mut second = GenericModel::<CustomCastModel>::new(Arc::clone(&registry));

    first
        .set_cast_attribute("reversed", "taylor")
        .expect("Failed to set");
    second
        .set_cast_attribute("reversed", "otwell")
        .expect("Failed to set");
    first
        .set_cast_attribute("password", "secret")
        .expect("Failed to set");

    assert_eq!(registry.cached_instances(), 2);
    assert_eq!(second.attributes().str("reversed"), Some("llewto"));
    assert_eq!(
        first
            .get_cast_attribute("reversed")
            .expect("Failed to get")
            .as_str(),
        Some("taylor")
    );
}

#[test]
fn test_caster_errors_abort_with_context() {
    let mut model = new_model();
    model.set_raw_attribute("options", json!("{broken"));

    let err = model.get_cast_attribute("options").unwrap_err();
    assert!(err.to_string().contains("`options`"));
    assert!(err.to_string().contains("`JsonCaster`"));
    assert!(matches!(err.root_cause(), Error::DecodeError(_)));

    let err = model
        .set_cast_attribute("address", "not an address")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::CastFailed { ref attribute, ref caster, .. }
            if attribute == "address" && caster == "AddressCaster"
    ));
}
