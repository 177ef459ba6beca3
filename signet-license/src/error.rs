//! Error types for license issuance, verification, and framing.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::schema::SchemaValidationResult;

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Errors that can occur while signing, verifying, or framing licenses.
///
/// Verification failures carry no key or signature bytes; the messages are
/// safe to surface to users.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Malformed DER or raw signature bytes.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// The signature does not match the license's current field values.
    #[error("license signature verification failed")]
    SignatureVerificationFailed,

    /// The license is past its expiration date.
    #[error("license expired on {0}")]
    Expired(DateTime<Utc>),

    /// The license failed schema validation.
    #[error("license violates schema: {0}")]
    SchemaViolation(SchemaValidationResult),

    /// Structurally invalid license or request frame.
    #[error(transparent)]
    Format(#[from] LicenseFormatError),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying key lifecycle failure.
    #[error(transparent)]
    Key(#[from] signet_keys::KeyError),

    /// Underlying interchange failure (request payload protection).
    #[error(transparent)]
    Interchange(#[from] signet_interchange::InterchangeError),
}

/// Tagged failures from the binary frame decoder.
///
/// Decoding runs magic → version → payload; each stage short-circuits to
/// its own variant, so callers can distinguish a wrong file from a
/// truncated or corrupted one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LicenseFormatError {
    /// Fewer bytes than the fixed header.
    #[error("frame too short: {actual} bytes, need at least {min}")]
    TooShort { min: usize, actual: usize },

    /// The 4-byte magic tag does not match.
    #[error("bad magic {actual:02x?}")]
    BadMagic { actual: [u8; 4] },

    /// The format version is not supported.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    /// The payload is present but unreadable.
    #[error("corrupted payload: {0}")]
    Corrupted(String),
}
