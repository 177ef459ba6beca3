//! Sealing a key to a recipient's X25519 public key.
//!
//! An ephemeral X25519 key pair performs ECDH against the recipient's
//! public key; the shared secret is stretched with HKDF-SHA256 into a
//! one-time symmetric key that encrypts the target key. Only the
//! ephemeral public key travels with the ciphertext, so the sender keeps
//! no long-term secret and the target key never appears on the wire in
//! the clear.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use signet_keys::{Key, KeyAlgorithm, KeyKind, PUBLIC_KEY_SIZE, SYMMETRIC_KEY_SIZE};
use x25519_dalek::{EphemeralSecret, PublicKey as X25519Public, StaticSecret};
use zeroize::Zeroizing;

use crate::cipher::{self, EncryptedBlob, NONCE_SIZE, TAG_SIZE};
use crate::error::{InterchangeError, InterchangeResult};
use crate::wrap::{key_from_plaintext, key_to_plaintext};

/// Current seal format version.
pub const SEAL_FORMAT_VERSION: u8 = 1;

const SEAL_CONTEXT: &[u8] = b"signet-seal-v1";

/// A key sealed to a recipient's public key.
#[derive(Clone, Debug)]
pub struct SealedKey {
    /// Seal format version.
    pub version: u8,
    /// Ephemeral sender public key for the ECDH exchange.
    pub ephemeral_public: [u8; PUBLIC_KEY_SIZE],
    /// The encrypted tagged key bytes.
    pub blob: EncryptedBlob,
}

impl SealedKey {
    /// Flattens to `[version][ephemeral public][nonce][ciphertext]`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + PUBLIC_KEY_SIZE + self.blob.len());
        out.push(self.version);
        out.extend_from_slice(&self.ephemeral_public);
        out.extend_from_slice(&self.blob.to_bytes());
        out
    }

    /// Parses the flattened form.
    pub fn from_bytes(bytes: &[u8]) -> InterchangeResult<Self> {
        if bytes.len() < 1 + PUBLIC_KEY_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(InterchangeError::InvalidFormat(
                "sealed key too short".to_string(),
            ));
        }
        if bytes[0] != SEAL_FORMAT_VERSION {
            return Err(InterchangeError::InvalidFormat(format!(
                "unsupported seal format version {}",
                bytes[0]
            )));
        }
        let mut ephemeral_public = [0u8; PUBLIC_KEY_SIZE];
        ephemeral_public.copy_from_slice(&bytes[1..1 + PUBLIC_KEY_SIZE]);
        Ok(Self {
            version: bytes[0],
            ephemeral_public,
            blob: EncryptedBlob::from_bytes(&bytes[1 + PUBLIC_KEY_SIZE..])?,
        })
    }
}

fn require_x25519(key: &Key, kind: KeyKind, operation: &'static str) -> InterchangeResult<()> {
    if key.kind() != kind {
        return Err(signet_keys::KeyError::WrongKind {
            expected: kind,
            actual: key.kind(),
        }
        .into());
    }
    let algorithm = key.require_algorithm(operation)?;
    if algorithm != KeyAlgorithm::X25519 {
        return Err(signet_keys::KeyError::UnsupportedAlgorithm {
            operation,
            algorithm,
        }
        .into());
    }
    Ok(())
}

/// Derives the one-time symmetric key for a seal exchange.
///
/// Both public keys go into the HKDF salt so the derived key is bound to
/// this sender/recipient pairing, not just the raw shared secret.
fn session_key(
    shared: &x25519_dalek::SharedSecret,
    ephemeral_public: &[u8; PUBLIC_KEY_SIZE],
    recipient_public: &[u8; PUBLIC_KEY_SIZE],
) -> InterchangeResult<Key> {
    let mut salt = [0u8; PUBLIC_KEY_SIZE * 2];
    salt[..PUBLIC_KEY_SIZE].copy_from_slice(ephemeral_public);
    salt[PUBLIC_KEY_SIZE..].copy_from_slice(recipient_public);

    let hk = Hkdf::<Sha256>::new(Some(&salt), shared.as_bytes());
    let mut key_bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
    hk.expand(SEAL_CONTEXT, key_bytes.as_mut())
        .map_err(|e| InterchangeError::KeyDerivation(e.to_string()))?;
    Ok(Key::symmetric(key_bytes.as_ref())?)
}

/// Seals `target` to `recipient_public` (an X25519 public [`Key`]).
pub fn seal_key(target: &Key, recipient_public: &Key) -> InterchangeResult<SealedKey> {
    require_x25519(recipient_public, KeyKind::Public, "sealing")?;
    let recipient_bytes: [u8; PUBLIC_KEY_SIZE] = recipient_public.to_array()?;

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519Public::from(&ephemeral).to_bytes();
    let shared = ephemeral.diffie_hellman(&X25519Public::from(recipient_bytes));

    let one_time = session_key(&shared, &ephemeral_public, &recipient_bytes)?;
    let plaintext = key_to_plaintext(target)?;
    let blob = cipher::encrypt(&one_time, &plaintext)?;

    Ok(SealedKey {
        version: SEAL_FORMAT_VERSION,
        ephemeral_public,
        blob,
    })
}

/// Unseals a key with the recipient's X25519 private [`Key`].
///
/// # Errors
///
/// A wrong recipient key or corrupted ciphertext fails with
/// [`InterchangeError::Mismatch`].
pub fn unseal_key(sealed: &SealedKey, recipient_private: &Key) -> InterchangeResult<Key> {
    require_x25519(recipient_private, KeyKind::Private, "unsealing")?;
    let secret_bytes: Zeroizing<[u8; 32]> = Zeroizing::new(recipient_private.to_array()?);

    let secret = StaticSecret::from(*secret_bytes);
    let recipient_public = X25519Public::from(&secret).to_bytes();
    let shared = secret.diffie_hellman(&X25519Public::from(sealed.ephemeral_public));

    let one_time = session_key(&shared, &sealed.ephemeral_public, &recipient_public)?;
    let plaintext = Zeroizing::new(cipher::decrypt(&one_time, &sealed.blob)?);
    key_from_plaintext(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_keys::KeyPair;

    #[test]
    fn seal_unseal_roundtrip() {
        let recipient = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
        let payload = Key::generate_symmetric();

        let sealed = seal_key(&payload, recipient.public()).unwrap();
        let opened = unseal_key(&sealed, recipient.private()).unwrap();

        let original = payload.with_bytes(|b| b.to_vec()).unwrap();
        let recovered = opened.with_bytes(|b| b.to_vec()).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn wrong_recipient_fails() {
        let recipient = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
        let stranger = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
        let sealed = seal_key(&Key::generate_symmetric(), recipient.public()).unwrap();
        let err = unseal_key(&sealed, stranger.private()).unwrap_err();
        assert!(matches!(err, InterchangeError::Mismatch));
    }

    #[test]
    fn ed25519_recipient_rejected() {
        let recipient = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
        let err = seal_key(&Key::generate_symmetric(), recipient.public()).unwrap_err();
        assert!(matches!(err, InterchangeError::Key(_)));
    }
}
