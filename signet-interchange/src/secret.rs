//! Secret (key-pair) representation: `private || public`.
//!
//! Decoding recomputes the public half from the private half and compares
//! it to the stored bytes, so an inconsistent pair can never be imported
//! silently.

use signet_keys::{derive_public_bytes, Key, KeyAlgorithm, KeyPair, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
use zeroize::Zeroizing;

use crate::error::{InterchangeError, InterchangeResult};

const SECRET_LEN: usize = PRIVATE_KEY_SIZE + PUBLIC_KEY_SIZE;

/// Flattens a key pair to `private || public` bytes.
///
/// The output contains the private key; treat it as secret material.
pub fn encode_secret(pair: &KeyPair) -> InterchangeResult<Zeroizing<Vec<u8>>> {
    let mut out = Zeroizing::new(Vec::with_capacity(SECRET_LEN));
    pair.private().with_bytes(|bytes| out.extend_from_slice(bytes))?;
    pair.public().with_bytes(|bytes| out.extend_from_slice(bytes))?;
    Ok(out)
}

/// Parses `private || public` bytes back into a [`KeyPair`].
///
/// # Errors
///
/// Fails with [`InterchangeError::Mismatch`] if the stored public half is
/// not the counterpart of the private half.
pub fn decode_secret(bytes: &[u8], algorithm: KeyAlgorithm) -> InterchangeResult<KeyPair> {
    if bytes.len() != SECRET_LEN {
        return Err(InterchangeError::InvalidFormat(format!(
            "secret key pair must be {SECRET_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let private = Key::private(&bytes[..PRIVATE_KEY_SIZE], algorithm)?;
    let stored_public = &bytes[PRIVATE_KEY_SIZE..];

    let derived = derive_public_bytes(&private)?;
    if derived != *stored_public {
        return Err(InterchangeError::Mismatch);
    }

    let public = Key::public(stored_public, algorithm)?;
    Ok(KeyPair::from_keys(private, public)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let pair = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
        let bytes = encode_secret(&pair).unwrap();
        let decoded = decode_secret(&bytes, KeyAlgorithm::Ed25519).unwrap();
        assert!(decoded.is_consistent().unwrap());
    }

    #[test]
    fn tampered_public_half_is_mismatch() {
        let pair = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
        let mut bytes = encode_secret(&pair).unwrap();
        bytes[PRIVATE_KEY_SIZE] ^= 0x01;
        let err = decode_secret(&bytes, KeyAlgorithm::Ed25519).unwrap_err();
        assert!(matches!(err, InterchangeError::Mismatch));
    }

    #[test]
    fn wrong_length_rejected() {
        let err = decode_secret(&[0u8; 63], KeyAlgorithm::Ed25519).unwrap_err();
        assert!(matches!(err, InterchangeError::InvalidFormat(_)));
    }
}
