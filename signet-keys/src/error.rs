//! Error types for key lifecycle operations.

use thiserror::Error;

use crate::key::{KeyAlgorithm, KeyKind};

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors that can occur while constructing or using key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key has been disposed; its bytes are gone.
    #[error("key has been disposed")]
    Disposed,

    /// Wrong byte length for the requested key kind.
    #[error("invalid {kind} length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        kind: KeyKind,
        expected: usize,
        actual: usize,
    },

    /// Salt shorter than the fixed minimum.
    #[error("invalid salt length: need at least {min} bytes, got {actual}")]
    InvalidSaltLength { min: usize, actual: usize },

    /// The key's algorithm cannot perform the requested operation.
    #[error("{algorithm} keys do not support {operation}")]
    UnsupportedAlgorithm {
        operation: &'static str,
        algorithm: KeyAlgorithm,
    },

    /// The operation needs an algorithm tag but the key carries none.
    #[error("key has no algorithm tag ({operation})")]
    MissingAlgorithm { operation: &'static str },

    /// A key of the wrong kind was supplied.
    #[error("expected a {expected}, got a {actual}")]
    WrongKind { expected: KeyKind, actual: KeyKind },

    /// The public key is not the counterpart of the private key.
    #[error("public key is not the counterpart of the private key")]
    InconsistentPair,

    /// The bytes do not decode as a valid public key on the curve.
    #[error("invalid public key encoding")]
    InvalidPublicKey,
}
