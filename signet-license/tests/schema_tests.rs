mod common;

use common::{acme_params, issuer, object};
use pretty_assertions::assert_eq;
use serde_json::json;
use signet_license::{
    generate, FieldType, FieldValidator, Schema, SchemaField, SectionSchema,
};

fn seat_schema() -> Schema {
    Schema::builder()
        .feature(
            "maxUsers",
            SchemaField::new(FieldType::Integer)
                .required()
                .with(FieldValidator::Range {
                    min: Some(1.0),
                    max: Some(10_000.0),
                    exclusive_min: false,
                    exclusive_max: false,
                }),
        )
        .feature("offline", SchemaField::new(FieldType::Boolean))
        .metadata(
            "customer",
            SchemaField::new(FieldType::String)
                .required()
                .with(FieldValidator::Length { min: Some(1), max: Some(200) }),
        )
        .allow_unknown_metadata()
        .build()
}

#[test]
fn conforming_license_has_no_violations() {
    let license = generate(issuer().private(), acme_params()).unwrap();
    let result = seat_schema().validate_license(&license);
    assert!(result.is_valid(), "{result}");
}

#[test]
fn missing_required_feature_is_named() {
    let mut params = acme_params();
    params.features = object(json!({"offline": true}));
    let license = generate(issuer().private(), params).unwrap();

    let result = seat_schema().validate_license(&license);
    assert!(!result.is_valid());
    let features = result.section("features").unwrap();
    assert_eq!(features["maxUsers"], vec!["required field is missing"]);
    assert!(result.section("metadata").is_none());
}

#[test]
fn absent_metadata_fails_required_metadata_fields() {
    let mut params = acme_params();
    params.metadata = None;
    let license = generate(issuer().private(), params).unwrap();

    let result = seat_schema().validate_license(&license);
    assert!(result.section("metadata").unwrap().contains_key("customer"));
}

#[test]
fn out_of_range_and_unknown_are_both_reported() {
    let mut params = acme_params();
    params.features = object(json!({"maxUsers": 0, "surprise": 1}));
    let license = generate(issuer().private(), params).unwrap();

    let result = seat_schema().validate_license(&license);
    let features = result.section("features").unwrap();
    assert_eq!(features.len(), 2);
    assert!(features["maxUsers"][0].contains("below minimum"));
    assert_eq!(features["surprise"], vec!["unknown field"]);
}

#[test]
fn unknown_metadata_is_tolerated_when_opted_in() {
    let mut params = acme_params();
    let metadata = params.metadata.as_mut().unwrap();
    metadata.insert("region".to_string(), json!("eu-west"));
    let license = generate(issuer().private(), params).unwrap();

    assert!(seat_schema().validate_license(&license).is_valid());
}

#[test]
fn fractional_number_is_not_an_integer() {
    let section = SectionSchema::new()
        .field("maxUsers", SchemaField::new(FieldType::Integer).required());
    let errors = section.validate(&object(json!({"maxUsers": 10.5})));
    assert_eq!(errors["maxUsers"], vec!["expected integer, got number"]);
}

#[test]
fn display_lists_every_violation() {
    let mut params = acme_params();
    params.features = object(json!({"surprise": 1}));
    params.metadata = None;
    let license = generate(issuer().private(), params).unwrap();

    let rendered = seat_schema().validate_license(&license).to_string();
    assert!(rendered.contains("features.maxUsers"));
    assert!(rendered.contains("features.surprise"));
    assert!(rendered.contains("metadata.customer"));
}
