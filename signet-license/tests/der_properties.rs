//! Property-based tests for the DER signature transcoder.
//!
//! Properties that must always hold:
//! - Encoding any (r, s) pair decodes back to its minimal form
//! - Raw 64-byte signatures survive the DER detour byte-for-byte
//! - Mutated or truncated DER fails cleanly, never panics

use proptest::prelude::*;
use signet_license::der::{decode, der_to_raw, encode, raw_to_der, RAW_SIGNATURE_SIZE};

fn integer_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..48)
}

/// Minimal big-endian form: leading zeros stripped, one byte kept for zero.
fn minimal(bytes: &[u8]) -> Vec<u8> {
    let start = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

proptest! {
    /// Encode/decode round-trips to the minimal integer form.
    #[test]
    fn encode_decode_roundtrip(r in integer_strategy(), s in integer_strategy()) {
        let der = encode(&r, &s);
        let (dr, ds) = decode(&der).unwrap();
        prop_assert_eq!(dr, minimal(&r));
        prop_assert_eq!(ds, minimal(&s));
    }

    /// Raw signatures survive the DER wrap and unwrap exactly.
    #[test]
    fn raw_der_roundtrip(raw in prop::array::uniform32(any::<u8>()).prop_flat_map(|a| {
        prop::array::uniform32(any::<u8>()).prop_map(move |b| {
            let mut raw = [0u8; RAW_SIGNATURE_SIZE];
            raw[..32].copy_from_slice(&a);
            raw[32..].copy_from_slice(&b);
            raw
        })
    })) {
        let der = raw_to_der(&raw);
        prop_assert_eq!(der_to_raw(&der).unwrap(), raw);
    }

    /// Truncating valid DER anywhere fails decoding.
    #[test]
    fn truncation_is_rejected(r in integer_strategy(), s in integer_strategy(), cut in 0usize..64) {
        let der = encode(&r, &s);
        let cut = cut % der.len();
        prop_assert!(decode(&der[..cut]).is_err());
    }

    /// A corrupted outer tag fails decoding.
    #[test]
    fn tag_corruption_is_rejected(r in integer_strategy(), s in integer_strategy(), tag in 0u8..255) {
        prop_assume!(tag != 0x30);
        let mut der = encode(&r, &s);
        der[0] = tag;
        prop_assert!(decode(&der).is_err());
    }

    /// Arbitrary bytes never panic the decoder.
    #[test]
    fn arbitrary_input_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes);
        let _ = der_to_raw(&bytes);
    }
}
