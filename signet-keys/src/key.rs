//! Owned key material with scoped access and deterministic disposal.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{KeyError, KeyResult};

/// Size of private keys in bytes (Ed25519 and X25519 scalars).
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of public keys in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of symmetric keys in bytes (256 bits for ChaCha20-Poly1305).
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Minimum salt length in bytes.
pub const MIN_SALT_SIZE: usize = 16;

/// What role a piece of key material plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Asymmetric private (signing or agreement) key.
    Private,
    /// Asymmetric public key.
    Public,
    /// Symmetric cipher key.
    Symmetric,
    /// Derivation salt. Not secret, but handled through the same lifecycle.
    Salt,
}

impl KeyKind {
    /// Required byte length for this kind, or `None` for variable-length
    /// kinds (salts, which only have a minimum).
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Private => Some(PRIVATE_KEY_SIZE),
            Self::Public => Some(PUBLIC_KEY_SIZE),
            Self::Symmetric => Some(SYMMETRIC_KEY_SIZE),
            Self::Salt => None,
        }
    }

    fn validate_len(&self, actual: usize) -> KeyResult<()> {
        match self.fixed_len() {
            Some(expected) if actual != expected => Err(KeyError::InvalidKeyLength {
                kind: *self,
                expected,
                actual,
            }),
            Some(_) => Ok(()),
            None if actual < MIN_SALT_SIZE => Err(KeyError::InvalidSaltLength {
                min: MIN_SALT_SIZE,
                actual,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Private => "private key",
            Self::Public => "public key",
            Self::Symmetric => "symmetric key",
            Self::Salt => "salt",
        };
        f.write_str(name)
    }
}

/// Algorithm a key is bound to. Salts carry no algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// Ed25519 signatures.
    Ed25519,
    /// X25519 key agreement.
    X25519,
    /// ChaCha20-Poly1305 authenticated encryption.
    ChaCha20Poly1305,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ed25519 => "Ed25519",
            Self::X25519 => "X25519",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        };
        f.write_str(name)
    }
}

/// A piece of key material with exclusive ownership of its bytes.
///
/// Raw bytes are only reachable through [`Key::with_bytes`] /
/// [`Key::with_bytes_async`]; the temporary copy handed to the closure is
/// zeroized when the call returns, unwinds, or the future is dropped.
pub struct Key {
    kind: KeyKind,
    algorithm: Option<KeyAlgorithm>,
    material: Vec<u8>,
    disposed: bool,
}

impl Key {
    fn new(bytes: &[u8], kind: KeyKind, algorithm: Option<KeyAlgorithm>) -> KeyResult<Self> {
        kind.validate_len(bytes.len())?;
        Ok(Self {
            kind,
            algorithm,
            // Defensive copy: the caller's buffer is never aliased.
            material: bytes.to_vec(),
            disposed: false,
        })
    }

    /// Constructs a private key for the given algorithm.
    pub fn private(bytes: &[u8], algorithm: KeyAlgorithm) -> KeyResult<Self> {
        Self::new(bytes, KeyKind::Private, Some(algorithm))
    }

    /// Constructs a public key for the given algorithm.
    pub fn public(bytes: &[u8], algorithm: KeyAlgorithm) -> KeyResult<Self> {
        Self::new(bytes, KeyKind::Public, Some(algorithm))
    }

    /// Constructs a symmetric ChaCha20-Poly1305 key.
    pub fn symmetric(bytes: &[u8]) -> KeyResult<Self> {
        Self::new(bytes, KeyKind::Symmetric, Some(KeyAlgorithm::ChaCha20Poly1305))
    }

    /// Constructs a salt. Must be at least [`MIN_SALT_SIZE`] bytes.
    pub fn salt(bytes: &[u8]) -> KeyResult<Self> {
        Self::new(bytes, KeyKind::Salt, None)
    }

    /// Generates a random symmetric key from the OS RNG.
    pub fn generate_symmetric() -> Self {
        let mut bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        rand::rngs::OsRng.fill_bytes(bytes.as_mut());
        Self::symmetric(bytes.as_ref()).expect("fixed-size buffer")
    }

    /// Generates a random salt of `len` bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::InvalidSaltLength`] if `len` is below the
    /// minimum.
    pub fn generate_salt(len: usize) -> KeyResult<Self> {
        if len < MIN_SALT_SIZE {
            return Err(KeyError::InvalidSaltLength {
                min: MIN_SALT_SIZE,
                actual: len,
            });
        }
        let mut bytes = vec![0u8; len];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self::salt(&bytes)
    }

    /// Returns the key's kind.
    #[must_use]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Returns the key's algorithm tag, if any. Salts have none.
    #[must_use]
    pub fn algorithm(&self) -> Option<KeyAlgorithm> {
        self.algorithm
    }

    /// Returns the algorithm tag or fails if the key carries none.
    pub fn require_algorithm(&self, operation: &'static str) -> KeyResult<KeyAlgorithm> {
        self.algorithm
            .ok_or(KeyError::MissingAlgorithm { operation })
    }

    /// Length of the key material in bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::Disposed`] after disposal.
    pub fn len(&self) -> KeyResult<usize> {
        self.guard()?;
        Ok(self.material.len())
    }

    /// Whether the key has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Runs `op` against a temporary copy of the key bytes.
    ///
    /// The copy is zeroized after `op` returns, even if it panics.
    ///
    /// # Errors
    ///
    /// Fails with [`KeyError::Disposed`] after disposal.
    pub fn with_bytes<R>(&self, op: impl FnOnce(&[u8]) -> R) -> KeyResult<R> {
        self.guard()?;
        let copy = Zeroizing::new(self.material.clone());
        Ok(op(&copy))
    }

    /// Async variant of [`Key::with_bytes`].
    ///
    /// The closure receives ownership of a zeroize-on-drop buffer, so the
    /// copy is scrubbed even when the future is dropped at an await point.
    pub async fn with_bytes_async<R, Fut>(
        &self,
        op: impl FnOnce(Zeroizing<Vec<u8>>) -> Fut,
    ) -> KeyResult<R>
    where
        Fut: Future<Output = R>,
    {
        self.guard()?;
        let copy = Zeroizing::new(self.material.clone());
        Ok(op(copy).await)
    }

    /// Copies the key bytes into a fixed-size array.
    ///
    /// Intended for handing material to cipher constructors that take
    /// `[u8; N]`. The returned buffer is the caller's to scrub; prefer
    /// wrapping it in [`Zeroizing`] immediately.
    pub fn to_array<const N: usize>(&self) -> KeyResult<[u8; N]> {
        self.with_bytes(|bytes| {
            bytes.try_into().map_err(|_| KeyError::InvalidKeyLength {
                kind: self.kind,
                expected: N,
                actual: bytes.len(),
            })
        })?
    }

    /// Zeroizes the key material in place and marks the key disposed.
    ///
    /// Idempotent: repeated calls are no-ops. Every other operation on a
    /// disposed key fails with [`KeyError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.material.zeroize();
        self.disposed = true;
    }

    fn guard(&self) -> KeyResult<()> {
        if self.disposed {
            return Err(KeyError::Disposed);
        }
        Ok(())
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl Clone for Key {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            algorithm: self.algorithm,
            material: self.material.clone(),
            disposed: self.disposed,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("kind", &self.kind)
            .field("algorithm", &self.algorithm)
            .field("material", &"[REDACTED]")
            .field("disposed", &self.disposed)
            .finish()
    }
}
