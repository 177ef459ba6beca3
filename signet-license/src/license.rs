//! The license entity and client-side license requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rounds a timestamp down to the minute.
///
/// Signed timestamps are always stored minute-rounded, so a re-parsed
/// license canonicalizes to exactly the bytes that were signed.
#[must_use]
pub fn round_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// The commercial type of a license.
///
/// Well-known types are closed variants; anything else round-trips through
/// [`LicenseType::Custom`] with equality and hashing by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LicenseType {
    Trial,
    Standard,
    Pro,
    /// A vendor-defined type outside the well-known set.
    Custom(String),
}

impl LicenseType {
    /// The type's canonical name, as signed and serialized.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Trial => "trial",
            Self::Standard => "standard",
            Self::Pro => "pro",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LicenseType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "trial" => Self::Trial,
            "standard" => Self::Standard,
            "pro" => Self::Pro,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl Serialize for LicenseType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LicenseType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().expect("infallible"))
    }
}

mod signature_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// A signed license.
///
/// Produced by the signing protocol and immutable in intent: every field
/// below except `signature` is covered by the signature, so any edit
/// requires re-signing. Verification always recomputes the canonical
/// string from the *current* field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Opaque license identifier.
    pub id: String,
    /// Application the license is issued for.
    pub app_id: String,
    /// Expiration, UTC, minute granularity.
    pub expiration_date: DateTime<Utc>,
    /// Issuance time, UTC, minute granularity.
    pub created_at: DateTime<Utc>,
    /// Detached signature over the canonical string (raw 64-byte Ed25519
    /// or legacy DER-wrapped), base64 in JSON.
    #[serde(with = "signature_base64")]
    pub signature: Vec<u8>,
    /// License type name.
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    /// Feature grants, signed.
    pub features: Map<String, Value>,
    /// Optional descriptive metadata, signed after reserved keys are
    /// stripped.
    pub metadata: Option<Map<String, Value>>,
    /// Whether this is a trial issuance.
    #[serde(default)]
    pub is_trial: bool,
}

/// A short-lived client request for a license to be minted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRequest {
    /// Hash identifying the requesting device.
    pub device_hash: String,
    /// Application the request is for.
    pub app_id: String,
    /// When the request was created, UTC, minute granularity.
    pub created_at: DateTime<Utc>,
    /// When the request stops being acceptable.
    pub expires_at: DateTime<Utc>,
}

impl LicenseRequest {
    /// Builds a request valid for `ttl` from now.
    #[must_use]
    pub fn new(device_hash: impl Into<String>, app_id: impl Into<String>, ttl: Duration) -> Self {
        let now = round_to_minute(Utc::now());
        Self {
            device_hash: device_hash.into(),
            app_id: app_id.into(),
            created_at: now,
            expires_at: round_to_minute(now + ttl),
        }
    }

    /// Whether the request has outlived its validity window.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
