//! Symmetric and password-based key wrapping.
//!
//! A wrapped key is the target key's tagged bytes encrypted under a
//! wrapping key with ChaCha20-Poly1305. The plaintext carries kind and
//! algorithm tags so unwrapping reconstructs an equivalent [`Key`], not
//! just raw bytes.

use signet_keys::{Key, KeyAlgorithm, KeyKind};
use zeroize::Zeroizing;

use crate::cipher::{self, EncryptedBlob, NONCE_SIZE, TAG_SIZE};
use crate::error::{InterchangeError, InterchangeResult};
use crate::kdf::{derive_wrapping_key, KdfParams};
use crate::local::{kind_tag, TAG_PRIVATE, TAG_PUBLIC, TAG_SALT, TAG_SYMMETRIC};

/// Current wrap format version.
pub const WRAP_FORMAT_VERSION: u8 = 1;

const ALG_NONE: u8 = 0x00;
const ALG_ED25519: u8 = 0x01;
const ALG_X25519: u8 = 0x02;
const ALG_CHACHA20POLY1305: u8 = 0x03;

fn algorithm_tag(algorithm: Option<KeyAlgorithm>) -> u8 {
    match algorithm {
        None => ALG_NONE,
        Some(KeyAlgorithm::Ed25519) => ALG_ED25519,
        Some(KeyAlgorithm::X25519) => ALG_X25519,
        Some(KeyAlgorithm::ChaCha20Poly1305) => ALG_CHACHA20POLY1305,
    }
}

/// Serializes a key to its tagged plaintext form: `[kind][alg][bytes]`.
pub(crate) fn key_to_plaintext(key: &Key) -> InterchangeResult<Zeroizing<Vec<u8>>> {
    let mut out = Zeroizing::new(Vec::with_capacity(2 + key.len()?));
    out.push(kind_tag(key.kind()));
    out.push(algorithm_tag(key.algorithm()));
    key.with_bytes(|bytes| out.extend_from_slice(bytes))?;
    Ok(out)
}

/// Rebuilds a key from its tagged plaintext form.
pub(crate) fn key_from_plaintext(plaintext: &[u8]) -> InterchangeResult<Key> {
    if plaintext.len() < 2 {
        return Err(InterchangeError::InvalidFormat(
            "wrapped key payload too short".to_string(),
        ));
    }
    let algorithm = match plaintext[1] {
        ALG_NONE => None,
        ALG_ED25519 => Some(KeyAlgorithm::Ed25519),
        ALG_X25519 => Some(KeyAlgorithm::X25519),
        ALG_CHACHA20POLY1305 => Some(KeyAlgorithm::ChaCha20Poly1305),
        other => {
            return Err(InterchangeError::InvalidFormat(format!(
                "unknown algorithm tag 0x{other:02x}"
            )))
        }
    };
    let bytes = &plaintext[2..];
    let key = match (plaintext[0], algorithm) {
        (TAG_PRIVATE, Some(alg)) => Key::private(bytes, alg)?,
        (TAG_PUBLIC, Some(alg)) => Key::public(bytes, alg)?,
        (TAG_SYMMETRIC, _) => Key::symmetric(bytes)?,
        (TAG_SALT, _) => Key::salt(bytes)?,
        (tag, _) => {
            return Err(InterchangeError::InvalidFormat(format!(
                "unknown key tag 0x{tag:02x}"
            )))
        }
    };
    Ok(key)
}

/// A key encrypted under another symmetric key.
#[derive(Clone, Debug)]
pub struct WrappedKey {
    /// Wrap format version.
    pub version: u8,
    /// The encrypted tagged key bytes.
    pub blob: EncryptedBlob,
}

impl WrappedKey {
    /// Flattens to `[version][nonce][ciphertext]`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.blob.len());
        out.push(self.version);
        out.extend_from_slice(&self.blob.to_bytes());
        out
    }

    /// Parses `[version][nonce][ciphertext]`.
    pub fn from_bytes(bytes: &[u8]) -> InterchangeResult<Self> {
        if bytes.len() < 1 + NONCE_SIZE + TAG_SIZE {
            return Err(InterchangeError::InvalidFormat(
                "wrapped key too short".to_string(),
            ));
        }
        if bytes[0] != WRAP_FORMAT_VERSION {
            return Err(InterchangeError::InvalidFormat(format!(
                "unsupported wrap format version {}",
                bytes[0]
            )));
        }
        Ok(Self {
            version: bytes[0],
            blob: EncryptedBlob::from_bytes(&bytes[1..])?,
        })
    }
}

/// Encrypts `target` under the symmetric `wrapping` key.
pub fn wrap_key(target: &Key, wrapping: &Key) -> InterchangeResult<WrappedKey> {
    let plaintext = key_to_plaintext(target)?;
    let blob = cipher::encrypt(wrapping, &plaintext)?;
    Ok(WrappedKey {
        version: WRAP_FORMAT_VERSION,
        blob,
    })
}

/// Decrypts a wrapped key.
///
/// # Errors
///
/// A wrong wrapping key or corrupted ciphertext fails with
/// [`InterchangeError::Mismatch`]; corrupted key bytes are never returned.
pub fn unwrap_key(wrapped: &WrappedKey, wrapping: &Key) -> InterchangeResult<Key> {
    let plaintext = Zeroizing::new(cipher::decrypt(wrapping, &wrapped.blob)?);
    key_from_plaintext(&plaintext)
}

/// A password-wrapped key together with the salt and cost parameters
/// needed to re-derive the wrapping key.
///
/// The salt and parameters are not secret; the whole structure is safe to
/// persist as-is.
#[derive(Clone, Debug)]
pub struct PasswordWrappedKey {
    /// Salt used for Argon2id derivation.
    pub salt: Vec<u8>,
    /// Cost parameters used for derivation.
    pub params: KdfParams,
    /// The wrapped key itself.
    pub wrapped: WrappedKey,
}

impl PasswordWrappedKey {
    /// Flattens to
    /// `[version][salt_len u16][salt][memory][time][parallelism][wrapped]`
    /// with little-endian length and u32 cost fields.
    ///
    /// # Errors
    ///
    /// Salts have no upper length bound at construction, so a salt longer
    /// than `u16::MAX` bytes fails with [`InterchangeError::InvalidParams`]
    /// rather than truncating the length field.
    pub fn to_bytes(&self) -> InterchangeResult<Vec<u8>> {
        let salt_len = u16::try_from(self.salt.len()).map_err(|_| {
            InterchangeError::InvalidParams(format!(
                "salt too long to serialize: {} bytes",
                self.salt.len()
            ))
        })?;
        let wrapped = self.wrapped.to_bytes();
        let mut out = Vec::with_capacity(3 + self.salt.len() + 12 + wrapped.len());
        out.push(WRAP_FORMAT_VERSION);
        out.extend_from_slice(&salt_len.to_le_bytes());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.params.memory_cost_kib.to_le_bytes());
        out.extend_from_slice(&self.params.time_cost.to_le_bytes());
        out.extend_from_slice(&self.params.parallelism.to_le_bytes());
        out.extend_from_slice(&wrapped);
        Ok(out)
    }

    /// Parses the flattened form.
    pub fn from_bytes(bytes: &[u8]) -> InterchangeResult<Self> {
        if bytes.len() < 3 {
            return Err(InterchangeError::InvalidFormat(
                "password-wrapped key too short".to_string(),
            ));
        }
        if bytes[0] != WRAP_FORMAT_VERSION {
            return Err(InterchangeError::InvalidFormat(format!(
                "unsupported wrap format version {}",
                bytes[0]
            )));
        }
        let salt_len = u16::from_le_bytes([bytes[1], bytes[2]]) as usize;
        let header_len = 3 + salt_len + 12;
        if bytes.len() < header_len {
            return Err(InterchangeError::InvalidFormat(
                "password-wrapped key truncated".to_string(),
            ));
        }
        let salt = bytes[3..3 + salt_len].to_vec();
        let mut u32_at = |offset: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(buf)
        };
        let params = KdfParams {
            memory_cost_kib: u32_at(3 + salt_len),
            time_cost: u32_at(3 + salt_len + 4),
            parallelism: u32_at(3 + salt_len + 8),
        };
        let wrapped = WrappedKey::from_bytes(&bytes[header_len..])?;
        Ok(Self {
            salt,
            params,
            wrapped,
        })
    }
}

/// Wraps `target` under a key derived from `password` and `salt`.
///
/// Parameter validation happens before derivation; an invalid memory,
/// time, or parallelism setting never costs a derivation.
pub fn wrap_with_password(
    target: &Key,
    password: &str,
    salt: &Key,
    params: &KdfParams,
) -> InterchangeResult<PasswordWrappedKey> {
    let wrapping = derive_wrapping_key(password, salt, params)?;
    let wrapped = wrap_key(target, &wrapping)?;
    let salt_bytes = salt.with_bytes(|b| b.to_vec())?;
    Ok(PasswordWrappedKey {
        salt: salt_bytes,
        params: params.clone(),
        wrapped,
    })
}

/// Unwraps a password-wrapped key by re-deriving the wrapping key.
///
/// # Errors
///
/// A wrong password fails with [`InterchangeError::Mismatch`].
pub fn unwrap_with_password(
    wrapped: &PasswordWrappedKey,
    password: &str,
) -> InterchangeResult<Key> {
    let salt = Key::salt(&wrapped.salt)?;
    let wrapping = derive_wrapping_key(password, &salt, &wrapped.params)?;
    unwrap_key(&wrapped.wrapped, &wrapping)
}
