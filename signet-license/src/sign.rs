//! The license signing and verification protocol.
//!
//! Signing digests the canonical string and signs the digest with
//! Ed25519. Signature, expiration, and schema checks are independently
//! callable; [`validate`] runs them in that order and stops at the first
//! failure.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256, Sha512};
use signet_keys::{Key, KeyAlgorithm, KeyError, KeyKind};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::canonical::canonical_string;
use crate::der;
use crate::error::{LicenseError, LicenseResult};
use crate::license::{round_to_minute, License, LicenseType};
use crate::schema::{Schema, SchemaValidationResult};

/// Digest applied to the canonical string before signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    #[default]
    Sha512,
}

impl DigestAlgorithm {
    /// Hashes a message with this algorithm.
    #[must_use]
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

/// The outcome of a single validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Failure description; never contains key or signature bytes.
    pub message: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    /// A failing result with a user-safe message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Unsigned inputs to [`generate`].
#[derive(Debug, Clone)]
pub struct LicenseParams {
    pub app_id: String,
    pub expiration_date: DateTime<Utc>,
    pub license_type: LicenseType,
    pub features: Map<String, Value>,
    pub metadata: Option<Map<String, Value>>,
    pub is_trial: bool,
}

fn require_ed25519(key: &Key, kind: KeyKind, operation: &'static str) -> LicenseResult<()> {
    if key.kind() != kind {
        return Err(KeyError::WrongKind {
            expected: kind,
            actual: key.kind(),
        }
        .into());
    }
    let algorithm = key.require_algorithm(operation)?;
    if algorithm != KeyAlgorithm::Ed25519 {
        return Err(KeyError::UnsupportedAlgorithm {
            operation,
            algorithm,
        }
        .into());
    }
    Ok(())
}

/// Signs a message digest, returning the raw 64-byte signature.
pub fn sign_detached(
    message: &[u8],
    private: &Key,
    digest: DigestAlgorithm,
) -> LicenseResult<[u8; der::RAW_SIGNATURE_SIZE]> {
    require_ed25519(private, KeyKind::Private, "license signing")?;
    let secret: Zeroizing<[u8; 32]> = Zeroizing::new(private.to_array()?);
    let signing = SigningKey::from_bytes(&secret);
    let hashed = digest.digest(message);
    Ok(signing.sign(&hashed).to_bytes())
}

/// Verifies a detached signature over a message digest.
///
/// Accepts raw 64-byte signatures and legacy DER-wrapped (r, s) pairs.
///
/// # Errors
///
/// [`LicenseError::InvalidSignatureFormat`] for malformed signature bytes,
/// [`LicenseError::SignatureVerificationFailed`] for a genuine mismatch.
pub fn verify_detached(
    message: &[u8],
    signature: &[u8],
    public: &Key,
    digest: DigestAlgorithm,
) -> LicenseResult<()> {
    require_ed25519(public, KeyKind::Public, "license verification")?;
    let raw: [u8; der::RAW_SIGNATURE_SIZE] = match signature.len() {
        der::RAW_SIGNATURE_SIZE => signature
            .try_into()
            .map_err(|_| LicenseError::SignatureVerificationFailed)?,
        _ => der::der_to_raw(signature)?,
    };

    let public_bytes: [u8; 32] = public.to_array()?;
    let verifying = VerifyingKey::from_bytes(&public_bytes)
        .map_err(|_| KeyError::InvalidPublicKey)?;

    let hashed = digest.digest(message);
    verifying
        .verify(&hashed, &Signature::from_bytes(&raw))
        .map_err(|_| LicenseError::SignatureVerificationFailed)
}

/// Mints a signed license with the default digest.
pub fn generate(private: &Key, params: LicenseParams) -> LicenseResult<License> {
    generate_with(private, params, DigestAlgorithm::default())
}

/// Mints a signed license with an explicit digest algorithm.
///
/// Dates are rounded down to the minute before the canonical string is
/// built, so a re-parsed license reproduces the signed bytes exactly.
pub fn generate_with(
    private: &Key,
    params: LicenseParams,
    digest: DigestAlgorithm,
) -> LicenseResult<License> {
    let id = Uuid::new_v4().to_string();
    let expiration_date = round_to_minute(params.expiration_date);
    let created_at = round_to_minute(Utc::now());

    let canonical = canonical_string(
        &id,
        &params.app_id,
        expiration_date,
        &params.license_type,
        &params.features,
        params.metadata.as_ref(),
    );
    let signature = sign_detached(canonical.as_bytes(), private, digest)?;

    tracing::debug!(
        license = %id,
        app = %params.app_id,
        kind = %params.license_type,
        "issued license"
    );

    Ok(License {
        id,
        app_id: params.app_id,
        expiration_date,
        created_at,
        signature: signature.to_vec(),
        license_type: params.license_type,
        features: params.features,
        metadata: params.metadata,
        is_trial: params.is_trial,
    })
}

/// Checks the signature against the license's current field values.
pub fn validate_signature(
    license: &License,
    public: &Key,
    digest: DigestAlgorithm,
) -> LicenseResult<ValidationResult> {
    let canonical = license.canonical_string();
    match verify_detached(canonical.as_bytes(), &license.signature, public, digest) {
        Ok(()) => Ok(ValidationResult::valid()),
        Err(LicenseError::SignatureVerificationFailed) => Ok(ValidationResult::invalid(
            "license signature does not match its contents",
        )),
        Err(LicenseError::InvalidSignatureFormat(_)) => Ok(ValidationResult::invalid(
            "license signature is malformed",
        )),
        Err(other) => Err(other),
    }
}

/// Checks expiration against an explicit clock. A license expiring exactly
/// at `now` is still valid.
#[must_use]
pub fn validate_expiration_at(license: &License, now: DateTime<Utc>) -> ValidationResult {
    if now > license.expiration_date {
        ValidationResult::invalid(format!("license expired on {}", license.expiration_date))
    } else {
        ValidationResult::valid()
    }
}

/// Checks expiration against the current time.
#[must_use]
pub fn validate_expiration(license: &License) -> ValidationResult {
    validate_expiration_at(license, Utc::now())
}

/// Runs schema validation over the license's features and metadata.
#[must_use]
pub fn validate_schema(license: &License, schema: &Schema) -> SchemaValidationResult {
    schema.validate_license(license)
}

/// Full validation: signature, then expiration, then schema (when given),
/// returning the first failure.
pub fn validate(
    license: &License,
    public: &Key,
    schema: Option<&Schema>,
) -> LicenseResult<ValidationResult> {
    validate_with(license, public, schema, DigestAlgorithm::default())
}

/// [`validate`] with an explicit digest algorithm.
pub fn validate_with(
    license: &License,
    public: &Key,
    schema: Option<&Schema>,
    digest: DigestAlgorithm,
) -> LicenseResult<ValidationResult> {
    let signature = validate_signature(license, public, digest)?;
    if !signature.is_valid {
        return Ok(signature);
    }

    let expiration = validate_expiration(license);
    if !expiration.is_valid {
        return Ok(expiration);
    }

    if let Some(schema) = schema {
        let result = validate_schema(license, schema);
        if !result.is_valid() {
            return Ok(ValidationResult::invalid(format!(
                "license violates schema: {result}"
            )));
        }
    }

    Ok(ValidationResult::valid())
}

impl License {
    /// [`validate`] as a method, failing with a typed error instead of a
    /// result value.
    ///
    /// # Errors
    ///
    /// [`LicenseError::SignatureVerificationFailed`],
    /// [`LicenseError::Expired`], or [`LicenseError::SchemaViolation`],
    /// in that order of precedence.
    pub fn ensure_valid(&self, public: &Key, schema: Option<&Schema>) -> LicenseResult<()> {
        let canonical = self.canonical_string();
        verify_detached(
            canonical.as_bytes(),
            &self.signature,
            public,
            DigestAlgorithm::default(),
        )?;
        if Utc::now() > self.expiration_date {
            return Err(LicenseError::Expired(self.expiration_date));
        }
        if let Some(schema) = schema {
            let result = schema.validate_license(self);
            if !result.is_valid() {
                return Err(LicenseError::SchemaViolation(result));
            }
        }
        Ok(())
    }
}
