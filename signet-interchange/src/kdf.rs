//! Password-based wrapping-key derivation with Argon2id.
//!
//! Derivation is deliberately slow (tens to hundreds of milliseconds).
//! Callers on an event loop should use the `async` feature's
//! [`derive_wrapping_key_async`], which offloads the work to a blocking
//! worker. Dropping the returned future abandons the result; derivation
//! has no partial output.

use argon2::{Argon2, Params, Version};
use signet_keys::{Key, KeyKind, SYMMETRIC_KEY_SIZE};
use zeroize::Zeroizing;

use crate::error::{InterchangeError, InterchangeResult};
use crate::local;

/// Memory cost must be a positive multiple of this many KiB.
pub const MEMORY_UNIT_KIB: u32 = 1024;

/// Argon2id cost parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost_kib: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id (2023)
        Self {
            memory_cost_kib: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Checks the parameters without doing any derivation work.
    ///
    /// # Errors
    ///
    /// Fails with [`InterchangeError::InvalidParams`] if the memory cost is
    /// zero or not a multiple of [`MEMORY_UNIT_KIB`], or if time cost or
    /// parallelism is zero.
    pub fn validate(&self) -> InterchangeResult<()> {
        if self.memory_cost_kib == 0 || self.memory_cost_kib % MEMORY_UNIT_KIB != 0 {
            return Err(InterchangeError::InvalidParams(format!(
                "memory cost must be a positive multiple of {MEMORY_UNIT_KIB} KiB, got {}",
                self.memory_cost_kib
            )));
        }
        if self.time_cost == 0 {
            return Err(InterchangeError::InvalidParams(
                "time cost must be at least 1".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(InterchangeError::InvalidParams(
                "parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fast parameters for tests. Insecure.
    pub fn insecure_test() -> Self {
        Self {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// Derives a symmetric wrapping key from a password and salt.
///
/// The salt is not secret; persist it next to whatever the derived key
/// encrypts so the key can be re-derived later from the same password.
///
/// # Errors
///
/// Parameter and salt validation failures are reported before any
/// derivation work begins.
pub fn derive_wrapping_key(
    password: &str,
    salt: &Key,
    params: &KdfParams,
) -> InterchangeResult<Key> {
    params.validate()?;
    if salt.kind() != KeyKind::Salt {
        return Err(signet_keys::KeyError::WrongKind {
            expected: KeyKind::Salt,
            actual: salt.kind(),
        }
        .into());
    }

    let argon2_params = Params::new(
        params.memory_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(SYMMETRIC_KEY_SIZE),
    )
    .map_err(|e| InterchangeError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key_bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
    salt.with_bytes(|salt_bytes| {
        argon2
            .hash_password_into(password.as_bytes(), salt_bytes, key_bytes.as_mut())
            .map_err(|e| InterchangeError::KeyDerivation(e.to_string()))
    })??;

    let key = Key::symmetric(key_bytes.as_ref())?;
    tracing::debug!(
        key = %local::fingerprint(&key)?,
        memory_kib = params.memory_cost_kib,
        time = params.time_cost,
        "derived wrapping key"
    );
    Ok(key)
}

/// [`derive_wrapping_key`] on a blocking worker thread.
///
/// The future resolves once derivation completes; dropping it detaches the
/// worker and discards the key. No partial result ever escapes.
#[cfg(feature = "async")]
pub async fn derive_wrapping_key_async(
    password: String,
    salt: Key,
    params: KdfParams,
) -> InterchangeResult<Key> {
    // Validate on the caller's thread so bad input fails immediately.
    params.validate()?;
    let password = Zeroizing::new(password);
    tokio::task::spawn_blocking(move || derive_wrapping_key(&password, &salt, &params))
        .await
        .map_err(|e| InterchangeError::KeyDerivation(format!("derivation task failed: {e}")))?
}
