//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use signet_keys::{KeyAlgorithm, KeyPair};
use signet_license::{generate, License, LicenseParams, LicenseType};

pub fn issuer() -> KeyPair {
    KeyPair::generate(KeyAlgorithm::Ed25519).unwrap()
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

pub fn acme_params() -> LicenseParams {
    LicenseParams {
        app_id: "com.acme.app".to_string(),
        expiration_date: Utc::now() + Duration::days(365),
        license_type: LicenseType::Standard,
        features: object(json!({"maxUsers": 10, "offline": true})),
        metadata: Some(object(json!({"customer": "Acme Corp"}))),
        is_trial: false,
    }
}

pub fn issue(pair: &KeyPair) -> License {
    generate(pair.private(), acme_params()).unwrap()
}
