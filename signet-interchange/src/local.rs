//! Local (symmetric) key representation.
//!
//! Layout: `[1 byte version][1 byte kind tag][32-byte key]`. The
//! fingerprint is a short content hash safe to write to logs; it cannot be
//! reversed into key bytes.

use sha2::{Digest, Sha256};
use signet_keys::{Key, KeyKind, SYMMETRIC_KEY_SIZE};
use zeroize::Zeroizing;

use crate::error::{InterchangeError, InterchangeResult};

/// Current local format version.
pub const LOCAL_FORMAT_VERSION: u8 = 1;

/// Number of fingerprint bytes taken from the content hash.
const FINGERPRINT_LEN: usize = 8;

const FINGERPRINT_CONTEXT: &[u8] = b"signet-local-fp-v1";

pub(crate) const TAG_PRIVATE: u8 = 0x01;
pub(crate) const TAG_PUBLIC: u8 = 0x02;
pub(crate) const TAG_SYMMETRIC: u8 = 0x03;
pub(crate) const TAG_SALT: u8 = 0x04;

pub(crate) fn kind_tag(kind: KeyKind) -> u8 {
    match kind {
        KeyKind::Private => TAG_PRIVATE,
        KeyKind::Public => TAG_PUBLIC,
        KeyKind::Symmetric => TAG_SYMMETRIC,
        KeyKind::Salt => TAG_SALT,
    }
}

/// Encodes a symmetric key into the local representation.
///
/// # Errors
///
/// Fails if the key is not symmetric or has been disposed.
pub fn encode_local(key: &Key) -> InterchangeResult<Vec<u8>> {
    if key.kind() != KeyKind::Symmetric {
        return Err(signet_keys::KeyError::WrongKind {
            expected: KeyKind::Symmetric,
            actual: key.kind(),
        }
        .into());
    }
    key.with_bytes(|bytes| {
        let mut out = Vec::with_capacity(2 + bytes.len());
        out.push(LOCAL_FORMAT_VERSION);
        out.push(TAG_SYMMETRIC);
        out.extend_from_slice(bytes);
        out
    })
    .map_err(Into::into)
}

/// Decodes a local representation back into a symmetric [`Key`].
pub fn decode_local(bytes: &[u8]) -> InterchangeResult<Key> {
    if bytes.len() != 2 + SYMMETRIC_KEY_SIZE {
        return Err(InterchangeError::InvalidFormat(format!(
            "local key must be {} bytes, got {}",
            2 + SYMMETRIC_KEY_SIZE,
            bytes.len()
        )));
    }
    if bytes[0] != LOCAL_FORMAT_VERSION {
        return Err(InterchangeError::InvalidFormat(format!(
            "unsupported local format version {}",
            bytes[0]
        )));
    }
    if bytes[1] != TAG_SYMMETRIC {
        return Err(InterchangeError::InvalidFormat(format!(
            "unexpected key tag 0x{:02x}",
            bytes[1]
        )));
    }
    let material = Zeroizing::new(bytes[2..].to_vec());
    Ok(Key::symmetric(&material)?)
}

/// Short content fingerprint of a symmetric key, hex-encoded.
///
/// Derived by hashing, so it identifies the key without revealing it.
pub fn fingerprint(key: &Key) -> InterchangeResult<String> {
    if key.kind() != KeyKind::Symmetric {
        return Err(signet_keys::KeyError::WrongKind {
            expected: KeyKind::Symmetric,
            actual: key.kind(),
        }
        .into());
    }
    let digest = key.with_bytes(|bytes| {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_CONTEXT);
        hasher.update(bytes);
        hasher.finalize()
    })?;
    Ok(hex::encode(&digest[..FINGERPRINT_LEN]))
}
