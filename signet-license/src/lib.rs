//! Offline software licensing for the Signet engine.
//!
//! A license is a set of signed fields (identity, expiration, type,
//! feature grants, metadata) whose canonical string is digested and
//! signed with Ed25519. Verification recomputes the canonical string from
//! the license's current values, so any tampered field invalidates the
//! signature. Validation runs signature, then expiration, then an
//! optional typed [`Schema`] over features and metadata.
//!
//! Licenses and client requests travel in a small binary frame
//! (`[magic][version][payload]`); request payloads are encrypted, either
//! under a pre-shared symmetric key or sealed to the server's X25519
//! public key.

pub mod canonical;
pub mod der;
mod error;
pub mod frame;
mod license;
pub mod schema;
mod sign;

pub use error::{LicenseError, LicenseFormatError, LicenseResult};
pub use frame::{
    decode_license, decode_request, encode_license, encode_request, RequestProtection,
    FRAME_VERSION, HEADER_LEN, LICENSE_MAGIC, REQUEST_MAGIC,
};
pub use license::{round_to_minute, License, LicenseRequest, LicenseType};
pub use schema::{
    FieldType, FieldValidator, Schema, SchemaBuilder, SchemaField, SchemaValidationResult,
    SectionSchema,
};
pub use sign::{
    generate, generate_with, sign_detached, validate, validate_expiration,
    validate_expiration_at, validate_schema, validate_signature, validate_with, verify_detached,
    DigestAlgorithm, LicenseParams, ValidationResult,
};
