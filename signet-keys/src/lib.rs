//! Key lifecycle for the Signet license engine.
//!
//! Every piece of key material in the engine (private keys, public keys,
//! symmetric keys, and salts) lives inside a [`Key`]. A `Key` owns its
//! bytes exclusively; the only way to read them is through the scoped
//! [`Key::with_bytes`] accessors, which hand the caller a temporary copy
//! that is zeroized on every exit path, including panics and cancelled
//! futures.
//!
//! Disposal is deterministic: [`Key::dispose`] scrubs the buffer in place,
//! and `Drop` scrubs it again if the caller never got around to it. There
//! is no finalizer-style best-effort path.

mod error;
mod key;
mod pair;

pub use error::{KeyError, KeyResult};
pub use key::{
    Key, KeyAlgorithm, KeyKind, MIN_SALT_SIZE, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE,
    SYMMETRIC_KEY_SIZE,
};
pub use pair::{derive_public_bytes, KeyPair};
