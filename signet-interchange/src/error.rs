//! Error types for key interchange.

use thiserror::Error;

/// Result type for interchange operations.
pub type InterchangeResult<T> = Result<T, InterchangeError>;

/// Errors that can occur while wrapping, deriving, or sealing keys.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// Argon2id derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Derivation parameters rejected before any work began.
    #[error("invalid derivation parameters: {0}")]
    InvalidParams(String),

    /// AEAD encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Wrong wrapping key or password, corrupted ciphertext, or a decoded
    /// pair whose halves do not belong together.
    #[error("key interchange mismatch (wrong key, wrong password, or corrupted data)")]
    Mismatch,

    /// Structurally invalid interchange bytes.
    #[error("invalid interchange format: {0}")]
    InvalidFormat(String),

    /// Underlying key lifecycle failure.
    #[error(transparent)]
    Key(#[from] signet_keys::KeyError),
}
