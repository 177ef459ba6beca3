//! Authenticated encryption with ChaCha20-Poly1305.
//!
//! Shared by the wrap and seal formats; also used by the license crate to
//! protect request payloads.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use signet_keys::{Key, KeyKind, SYMMETRIC_KEY_SIZE};
use zeroize::Zeroizing;

use crate::error::{InterchangeError, InterchangeResult};

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Ciphertext with the nonce needed for decryption.
#[derive(Clone, Debug)]
pub struct EncryptedBlob {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext, including the auth tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Total size in bytes when flattened.
    #[must_use]
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Whether the ciphertext is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Flattens to `nonce || ciphertext`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Parses `nonce || ciphertext`.
    pub fn from_bytes(bytes: &[u8]) -> InterchangeResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(InterchangeError::InvalidFormat(
                "encrypted blob too short".to_string(),
            ));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }

    /// Encodes to base64 for storage or transmission.
    #[must_use]
    pub fn to_base64(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes from base64.
    pub fn from_base64(encoded: &str) -> InterchangeResult<Self> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| InterchangeError::InvalidFormat(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

fn cipher_for(key: &Key) -> InterchangeResult<ChaCha20Poly1305> {
    if key.kind() != KeyKind::Symmetric {
        return Err(signet_keys::KeyError::WrongKind {
            expected: KeyKind::Symmetric,
            actual: key.kind(),
        }
        .into());
    }
    let bytes: Zeroizing<[u8; SYMMETRIC_KEY_SIZE]> = Zeroizing::new(key.to_array()?);
    Ok(ChaCha20Poly1305::new((&*bytes).into()))
}

/// Encrypts plaintext under a symmetric [`Key`] with a random nonce.
pub fn encrypt(key: &Key, plaintext: &[u8]) -> InterchangeResult<EncryptedBlob> {
    let cipher = cipher_for(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| InterchangeError::Encryption(e.to_string()))?;

    Ok(EncryptedBlob {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts a blob under a symmetric [`Key`].
///
/// # Errors
///
/// Fails with [`InterchangeError::Mismatch`] on a wrong key or tampered
/// ciphertext. The error carries no key or plaintext bytes.
pub fn decrypt(key: &Key, encrypted: &EncryptedBlob) -> InterchangeResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(&encrypted.nonce);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_ref())
        .map_err(|_| InterchangeError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = Key::generate_symmetric();
        let blob = encrypt(&key, b"license bytes").unwrap();
        assert_eq!(decrypt(&key, &blob).unwrap(), b"license bytes");
    }

    #[test]
    fn wrong_key_is_mismatch() {
        let blob = encrypt(&Key::generate_symmetric(), b"x").unwrap();
        let err = decrypt(&Key::generate_symmetric(), &blob).unwrap_err();
        assert!(matches!(err, InterchangeError::Mismatch));
    }

    #[test]
    fn non_symmetric_key_rejected() {
        let salt = Key::generate_salt(16).unwrap();
        assert!(encrypt(&salt, b"x").is_err());
    }

    #[test]
    fn base64_roundtrip() {
        let key = Key::generate_symmetric();
        let blob = encrypt(&key, b"payload").unwrap();
        let restored = EncryptedBlob::from_base64(&blob.to_base64()).unwrap();
        assert_eq!(decrypt(&key, &restored).unwrap(), b"payload");
    }
}
