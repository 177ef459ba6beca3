mod common;

use chrono::Duration;
use common::{issue, issuer};
use pretty_assertions::assert_eq;
use signet_keys::{Key, KeyAlgorithm, KeyPair};
use signet_license::{
    decode_license, decode_request, encode_license, encode_request, validate, LicenseError,
    LicenseFormatError, LicenseRequest, RequestProtection, HEADER_LEN, LICENSE_MAGIC,
};

fn format_error(err: LicenseError) -> LicenseFormatError {
    match err {
        LicenseError::Format(inner) => inner,
        other => panic!("expected format error, got {other}"),
    }
}

// ── License frames ───────────────────────────────────────────────

#[test]
fn license_frame_roundtrip() {
    let pair = issuer();
    let license = issue(&pair);

    let frame = encode_license(&license).unwrap();
    assert_eq!(&frame[..4], &LICENSE_MAGIC);

    let decoded = decode_license(&frame).unwrap();
    assert_eq!(decoded, license);
    assert!(validate(&decoded, pair.public(), None).unwrap().is_valid);
}

#[test]
fn short_buffer_is_too_short() {
    let err = format_error(decode_license(b"LCS").unwrap_err());
    assert_eq!(err, LicenseFormatError::TooShort { min: HEADER_LEN, actual: 3 });
}

#[test]
fn wrong_magic_is_bad_magic() {
    let pair = issuer();
    let mut frame = encode_license(&issue(&pair)).unwrap();
    frame[..4].copy_from_slice(b"ZIPF");

    let err = format_error(decode_license(&frame).unwrap_err());
    assert_eq!(err, LicenseFormatError::BadMagic { actual: *b"ZIPF" });
}

#[test]
fn future_version_is_unsupported() {
    let pair = issuer();
    let mut frame = encode_license(&issue(&pair)).unwrap();
    frame[4..8].copy_from_slice(&7u32.to_le_bytes());

    let err = format_error(decode_license(&frame).unwrap_err());
    assert_eq!(err, LicenseFormatError::UnsupportedVersion(7));
}

#[test]
fn mangled_payload_is_corrupted() {
    let pair = issuer();
    let mut frame = encode_license(&issue(&pair)).unwrap();
    frame.truncate(HEADER_LEN + 5);

    let err = format_error(decode_license(&frame).unwrap_err());
    assert!(matches!(err, LicenseFormatError::Corrupted(_)));
}

// ── Request frames ───────────────────────────────────────────────

fn request() -> LicenseRequest {
    LicenseRequest::new("device-hash-01", "com.acme.app", Duration::hours(1))
}

#[test]
fn symmetric_request_roundtrip() {
    let shared = Key::generate_symmetric();
    let original = request();

    let frame = encode_request(&original, RequestProtection::Symmetric(&shared)).unwrap();
    let decoded = decode_request(&frame, &shared).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn sealed_request_roundtrip() {
    let server = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let original = request();

    let frame = encode_request(&original, RequestProtection::Sealed(server.public())).unwrap();
    let decoded = decode_request(&frame, server.private()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn request_payload_is_not_plaintext() {
    let shared = Key::generate_symmetric();
    let frame = encode_request(&request(), RequestProtection::Symmetric(&shared)).unwrap();
    let haystack = &frame[HEADER_LEN..];
    let needle = b"device-hash-01";
    assert!(!haystack.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn wrong_symmetric_key_is_mismatch() {
    let frame = encode_request(
        &request(),
        RequestProtection::Symmetric(&Key::generate_symmetric()),
    )
    .unwrap();
    let err = decode_request(&frame, &Key::generate_symmetric()).unwrap_err();
    assert!(matches!(err, LicenseError::Interchange(_)));
}

#[test]
fn wrong_recipient_cannot_open_a_sealed_request() {
    let server = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let stranger = KeyPair::generate(KeyAlgorithm::X25519).unwrap();

    let frame = encode_request(&request(), RequestProtection::Sealed(server.public())).unwrap();
    let err = decode_request(&frame, stranger.private()).unwrap_err();
    assert!(matches!(err, LicenseError::Interchange(_)));
}

#[test]
fn symmetric_key_cannot_open_a_sealed_request() {
    let server = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let frame = encode_request(&request(), RequestProtection::Sealed(server.public())).unwrap();
    let err = decode_request(&frame, &Key::generate_symmetric()).unwrap_err();
    assert!(matches!(err, LicenseError::Key(_)));
}

#[test]
fn unknown_protection_tag_is_corrupted() {
    let shared = Key::generate_symmetric();
    let mut frame = encode_request(&request(), RequestProtection::Symmetric(&shared)).unwrap();
    frame[HEADER_LEN] = 0x7E;

    let err = format_error(decode_request(&frame, &shared).unwrap_err());
    assert!(matches!(err, LicenseFormatError::Corrupted(_)));
}

#[test]
fn truncated_sealed_frame_is_corrupted() {
    let server = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let frame = encode_request(&request(), RequestProtection::Sealed(server.public())).unwrap();

    let err = format_error(
        decode_request(&frame[..HEADER_LEN + 2], server.private()).unwrap_err(),
    );
    assert!(matches!(err, LicenseFormatError::Corrupted(_)));
}

#[test]
fn request_expiry_window() {
    let req = request();
    assert!(!req.is_expired_at(req.expires_at));
    assert!(req.is_expired_at(req.expires_at + Duration::minutes(1)));
}
