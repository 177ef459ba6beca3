use signet_keys::{
    Key, KeyAlgorithm, KeyError, KeyKind, KeyPair, MIN_SALT_SIZE, SYMMETRIC_KEY_SIZE,
};

// ── Construction ─────────────────────────────────────────────────

#[test]
fn symmetric_from_bytes() {
    let key = Key::symmetric(&[7u8; SYMMETRIC_KEY_SIZE]).unwrap();
    assert_eq!(key.kind(), KeyKind::Symmetric);
    assert_eq!(key.algorithm(), Some(KeyAlgorithm::ChaCha20Poly1305));
    assert_eq!(key.len().unwrap(), SYMMETRIC_KEY_SIZE);
}

#[test]
fn wrong_length_rejected() {
    let err = Key::symmetric(&[7u8; 16]).unwrap_err();
    assert!(matches!(
        err,
        KeyError::InvalidKeyLength {
            expected: 32,
            actual: 16,
            ..
        }
    ));

    let err = Key::private(&[1u8; 33], KeyAlgorithm::Ed25519).unwrap_err();
    assert!(matches!(err, KeyError::InvalidKeyLength { actual: 33, .. }));
}

#[test]
fn salt_minimum_enforced() {
    assert!(Key::salt(&[0u8; MIN_SALT_SIZE]).is_ok());
    assert!(Key::salt(&[0u8; MIN_SALT_SIZE + 8]).is_ok());
    let err = Key::salt(&[0u8; MIN_SALT_SIZE - 1]).unwrap_err();
    assert!(matches!(err, KeyError::InvalidSaltLength { .. }));
    assert!(Key::generate_salt(4).is_err());
    assert_eq!(Key::generate_salt(24).unwrap().len().unwrap(), 24);
}

#[test]
fn stores_a_defensive_copy() {
    let mut source = [9u8; SYMMETRIC_KEY_SIZE];
    let key = Key::symmetric(&source).unwrap();
    source[0] = 0;
    key.with_bytes(|bytes| assert_eq!(bytes[0], 9)).unwrap();
}

#[test]
fn generated_symmetric_keys_differ() {
    let a = Key::generate_symmetric();
    let b = Key::generate_symmetric();
    let a_bytes = a.with_bytes(|b| b.to_vec()).unwrap();
    let b_bytes = b.with_bytes(|b| b.to_vec()).unwrap();
    assert_ne!(a_bytes, b_bytes);
}

// ── Scoped access ────────────────────────────────────────────────

#[test]
fn with_bytes_returns_closure_result() {
    let key = Key::symmetric(&[3u8; 32]).unwrap();
    let sum: u32 = key.with_bytes(|b| b.iter().map(|&x| u32::from(x)).sum()).unwrap();
    assert_eq!(sum, 96);
}

#[tokio::test]
async fn with_bytes_async_returns_result() {
    let key = Key::symmetric(&[1u8; 32]).unwrap();
    let len = key.with_bytes_async(|buf| async move { buf.len() }).await.unwrap();
    assert_eq!(len, 32);
}

#[test]
fn with_bytes_zeroizes_on_panic() {
    // The copy is a zeroize-on-drop buffer; unwinding must not leak it.
    let key = Key::symmetric(&[5u8; 32]).unwrap();
    let result = std::panic::catch_unwind(|| {
        key.with_bytes(|_| panic!("boom")).unwrap();
    });
    assert!(result.is_err());
    // Key itself is still usable afterwards.
    assert!(key.with_bytes(|b| b.len()).is_ok());
}

// ── Disposal ─────────────────────────────────────────────────────

#[test]
fn dispose_is_idempotent() {
    let mut key = Key::generate_symmetric();
    key.dispose();
    assert!(key.is_disposed());
    key.dispose();
    assert!(key.is_disposed());
}

#[test]
fn disposed_key_refuses_everything() {
    let mut key = Key::generate_symmetric();
    key.dispose();
    assert!(matches!(key.with_bytes(|_| ()), Err(KeyError::Disposed)));
    assert!(matches!(key.len(), Err(KeyError::Disposed)));
    assert!(matches!(key.to_array::<32>(), Err(KeyError::Disposed)));
}

#[test]
fn clone_is_independent_of_disposal() {
    let mut key = Key::generate_symmetric();
    let copy = key.clone();
    key.dispose();
    assert!(copy.with_bytes(|b| b.len()).is_ok());
}

// ── Key pairs ────────────────────────────────────────────────────

#[test]
fn pair_roundtrip_through_secret_bytes() {
    let pair = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let secret = pair.private().with_bytes(|b| b.to_vec()).unwrap();
    let rebuilt = KeyPair::from_secret_bytes(&secret, KeyAlgorithm::Ed25519).unwrap();
    assert!(rebuilt.is_consistent().unwrap());

    let orig_pub = pair.public().with_bytes(|b| b.to_vec()).unwrap();
    let new_pub = rebuilt.public().with_bytes(|b| b.to_vec()).unwrap();
    assert_eq!(orig_pub, new_pub);
}

#[test]
fn pair_dispose_covers_both_halves() {
    let mut pair = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    pair.dispose();
    assert!(pair.private().is_disposed());
    assert!(pair.public().is_disposed());
    assert!(matches!(pair.is_consistent(), Err(KeyError::Disposed)));
}

#[test]
fn from_keys_rejects_algorithm_mismatch() {
    let ed = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let x = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let (private, _) = ed.into_keys();
    let (_, public) = x.into_keys();
    assert!(matches!(
        KeyPair::from_keys(private, public),
        Err(KeyError::InconsistentPair)
    ));
}
