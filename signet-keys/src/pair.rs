//! Asymmetric key pairs and private→public consistency checks.

use ed25519_dalek::SigningKey as EdSigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{KeyError, KeyResult};
use crate::key::{Key, KeyAlgorithm, KeyKind, PRIVATE_KEY_SIZE};

/// Recomputes the public key bytes from a private key.
///
/// Supported for Ed25519 and X25519, where the public half is a pure
/// function of the private scalar.
///
/// # Errors
///
/// Fails if the key is disposed, is not a private key, or uses an
/// algorithm without public-key recomputation.
pub fn derive_public_bytes(private: &Key) -> KeyResult<[u8; 32]> {
    if private.kind() != KeyKind::Private {
        return Err(KeyError::WrongKind {
            expected: KeyKind::Private,
            actual: private.kind(),
        });
    }
    let algorithm = private.require_algorithm("public key derivation")?;
    let secret: Zeroizing<[u8; PRIVATE_KEY_SIZE]> = Zeroizing::new(private.to_array()?);
    match algorithm {
        KeyAlgorithm::Ed25519 => {
            let signing = EdSigningKey::from_bytes(&secret);
            Ok(signing.verifying_key().to_bytes())
        }
        KeyAlgorithm::X25519 => {
            let secret = x25519_dalek::StaticSecret::from(*secret);
            Ok(x25519_dalek::PublicKey::from(&secret).to_bytes())
        }
        KeyAlgorithm::ChaCha20Poly1305 => Err(KeyError::UnsupportedAlgorithm {
            operation: "public key derivation",
            algorithm,
        }),
    }
}

/// A private/public key pair under a single algorithm.
pub struct KeyPair {
    private: Key,
    public: Key,
}

impl KeyPair {
    /// Generates a fresh key pair.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::UnsupportedAlgorithm`] for symmetric-only
    /// algorithms.
    pub fn generate(algorithm: KeyAlgorithm) -> KeyResult<Self> {
        match algorithm {
            KeyAlgorithm::Ed25519 => {
                let signing = EdSigningKey::generate(&mut OsRng);
                let secret = Zeroizing::new(signing.to_bytes());
                let public = signing.verifying_key().to_bytes();
                Ok(Self {
                    private: Key::private(secret.as_ref(), algorithm)?,
                    public: Key::public(&public, algorithm)?,
                })
            }
            KeyAlgorithm::X25519 => {
                let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
                let public = x25519_dalek::PublicKey::from(&secret).to_bytes();
                let secret_bytes = Zeroizing::new(secret.to_bytes());
                Ok(Self {
                    private: Key::private(secret_bytes.as_ref(), algorithm)?,
                    public: Key::public(&public, algorithm)?,
                })
            }
            KeyAlgorithm::ChaCha20Poly1305 => Err(KeyError::UnsupportedAlgorithm {
                operation: "key pair generation",
                algorithm,
            }),
        }
    }

    /// Rebuilds a pair from a 32-byte private scalar, recomputing the
    /// public half.
    pub fn from_secret_bytes(secret: &[u8], algorithm: KeyAlgorithm) -> KeyResult<Self> {
        let private = Key::private(secret, algorithm)?;
        let public_bytes = derive_public_bytes(&private)?;
        let public = Key::public(&public_bytes, algorithm)?;
        Ok(Self { private, public })
    }

    /// Assembles a pair from existing keys without consistency checking.
    ///
    /// # Errors
    ///
    /// Fails if the kinds are wrong or the algorithm tags differ.
    pub fn from_keys(private: Key, public: Key) -> KeyResult<Self> {
        if private.kind() != KeyKind::Private {
            return Err(KeyError::WrongKind {
                expected: KeyKind::Private,
                actual: private.kind(),
            });
        }
        let algorithm = private.require_algorithm("key pair assembly")?;
        if public.kind() != KeyKind::Public || public.algorithm() != Some(algorithm) {
            return Err(KeyError::InconsistentPair);
        }
        Ok(Self { private, public })
    }

    /// Verifies that the public key is the true counterpart of the
    /// private key by recomputing it from the private scalar.
    pub fn is_consistent(&self) -> KeyResult<bool> {
        let derived = derive_public_bytes(&self.private)?;
        self.public.with_bytes(|stored| stored == derived)
    }

    /// The private half.
    #[must_use]
    pub fn private(&self) -> &Key {
        &self.private
    }

    /// The public half.
    #[must_use]
    pub fn public(&self) -> &Key {
        &self.public
    }

    /// Consumes the pair, returning `(private, public)`.
    #[must_use]
    pub fn into_keys(self) -> (Key, Key) {
        (self.private, self.public)
    }

    /// Disposes both halves.
    pub fn dispose(&mut self) {
        self.private.dispose();
        self.public.dispose();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &self.private)
            .field("public", &self.public)
            .finish()
    }
}
