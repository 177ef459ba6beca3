//! Canonical string construction.
//!
//! The canonical string is the exact byte sequence that gets digested and
//! signed. Field order is fixed, timestamps are minute-rounded UTC, and
//! maps are serialized with recursively sorted keys so the encoding never
//! depends on insertion order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::license::{round_to_minute, License, LicenseType};

/// Metadata keys describing the signature itself. They are stripped before
/// canonicalization: including them would make the signed bytes depend on
/// the not-yet-computed signature.
pub const RESERVED_METADATA_KEYS: [&str; 3] = ["algorithm", "curve", "signature"];

fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (key, val) in entries {
                out.insert(key.clone(), sorted_value(val));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}

/// Serializes a JSON map with recursively sorted keys.
#[must_use]
pub fn stable_json(map: &Map<String, Value>) -> String {
    sorted_value(&Value::Object(map.clone())).to_string()
}

fn stripped_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    let mut out = metadata.clone();
    for key in RESERVED_METADATA_KEYS {
        out.remove(key);
    }
    out
}

/// Builds the canonical string for a set of license fields.
///
/// Order: id, appId, expiration (RFC 3339 UTC, minute-rounded), type name,
/// stable features JSON, stable metadata JSON with reserved keys stripped
/// (`null` when absent).
#[must_use]
pub fn canonical_string(
    id: &str,
    app_id: &str,
    expiration_date: DateTime<Utc>,
    license_type: &LicenseType,
    features: &Map<String, Value>,
    metadata: Option<&Map<String, Value>>,
) -> String {
    let expiration = round_to_minute(expiration_date).to_rfc3339_opts(SecondsFormat::Secs, true);
    let metadata_json = match metadata {
        Some(map) => stable_json(&stripped_metadata(map)),
        None => "null".to_string(),
    };
    format!(
        "{id}{app_id}{expiration}{}{}{metadata_json}",
        license_type.name(),
        stable_json(features),
    )
}

impl License {
    /// The canonical string for this license's current field values.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        canonical_string(
            &self.id,
            &self.app_id,
            self.expiration_date,
            &self.license_type,
            &self.features,
            self.metadata.as_ref(),
        )
    }
}
