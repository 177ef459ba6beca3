//! Key interchange formats for the Signet license engine.
//!
//! Key material moves between parties in one of four shapes:
//!
//! - **Local**: a versioned, tagged byte string carrying a raw symmetric
//!   key, with a content [`fingerprint`](local::fingerprint) safe to log.
//! - **Secret**: a key pair flattened to `private || public`; decoding
//!   recomputes the public half and refuses inconsistent pairs.
//! - **Wrapped**: a key encrypted under another symmetric key, or under a
//!   key derived from a password with Argon2id.
//! - **Sealed**: a key encrypted to a recipient's X25519 public key via an
//!   ephemeral ECDH exchange, for asymmetric delivery.
//!
//! Nothing here performs I/O; callers move the resulting byte strings.

mod cipher;
mod error;
mod kdf;
mod local;
mod seal;
mod secret;
mod wrap;

pub use cipher::{decrypt, encrypt, EncryptedBlob, NONCE_SIZE, TAG_SIZE};
pub use error::{InterchangeError, InterchangeResult};
pub use kdf::{derive_wrapping_key, KdfParams, MEMORY_UNIT_KIB};
#[cfg(feature = "async")]
pub use kdf::derive_wrapping_key_async;
pub use local::{decode_local, encode_local, fingerprint, LOCAL_FORMAT_VERSION};
pub use seal::{seal_key, unseal_key, SealedKey};
pub use secret::{decode_secret, encode_secret};
pub use wrap::{
    unwrap_key, unwrap_with_password, wrap_key, wrap_with_password, PasswordWrappedKey,
    WrappedKey,
};
