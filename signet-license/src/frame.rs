//! Binary framing for licenses and license requests.
//!
//! A frame is `[4-byte magic][u32 LE version][payload]`. License payloads
//! are plain JSON; request payloads are encrypted, either under a
//! pre-shared symmetric key or under a one-time key sealed to the server's
//! X25519 public key. Decoding checks magic before version before payload,
//! so each failure mode maps to its own [`LicenseFormatError`] variant.

use signet_interchange::{decrypt, encrypt, seal_key, unseal_key, EncryptedBlob, SealedKey};
use signet_keys::{Key, KeyKind};
use zeroize::Zeroizing;

use crate::error::{LicenseFormatError, LicenseResult};
use crate::license::{License, LicenseRequest};

/// Magic tag opening a license frame.
pub const LICENSE_MAGIC: [u8; 4] = *b"LCSF";

/// Magic tag opening a license request frame.
pub const REQUEST_MAGIC: [u8; 4] = *b"LCRQ";

/// Current frame format version.
pub const FRAME_VERSION: u32 = 1;

/// Magic plus version.
pub const HEADER_LEN: usize = 8;

const TAG_SYMMETRIC: u8 = 0x01;
const TAG_SEALED: u8 = 0x02;

fn encode_header(magic: [u8; 4], out: &mut Vec<u8>) {
    out.extend_from_slice(&magic);
    out.extend_from_slice(&FRAME_VERSION.to_le_bytes());
}

/// Strips and checks the header, returning the payload.
///
/// Order matters: a short buffer is [`LicenseFormatError::TooShort`] even
/// if its first bytes happen to be a bad magic, and a wrong magic is
/// reported before the version is looked at.
fn decode_header(bytes: &[u8], magic: [u8; 4]) -> Result<&[u8], LicenseFormatError> {
    if bytes.len() < HEADER_LEN {
        return Err(LicenseFormatError::TooShort {
            min: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let mut actual = [0u8; 4];
    actual.copy_from_slice(&bytes[..4]);
    if actual != magic {
        return Err(LicenseFormatError::BadMagic { actual });
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FRAME_VERSION {
        return Err(LicenseFormatError::UnsupportedVersion(version));
    }
    Ok(&bytes[HEADER_LEN..])
}

/// Serializes a license into a framed byte vector.
pub fn encode_license(license: &License) -> LicenseResult<Vec<u8>> {
    let payload = serde_json::to_vec(license)?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    encode_header(LICENSE_MAGIC, &mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parses a framed license.
///
/// # Errors
///
/// [`LicenseFormatError`] variants for a short, mistagged, or
/// wrong-version frame; [`LicenseFormatError::Corrupted`] when the header
/// is sound but the JSON payload is not.
pub fn decode_license(bytes: &[u8]) -> LicenseResult<License> {
    let payload = decode_header(bytes, LICENSE_MAGIC)?;
    let license = serde_json::from_slice(payload)
        .map_err(|e| LicenseFormatError::Corrupted(e.to_string()))?;
    Ok(license)
}

/// How a request payload is protected in transit.
#[derive(Debug)]
pub enum RequestProtection<'a> {
    /// Encrypt under a pre-shared symmetric [`Key`].
    Symmetric(&'a Key),
    /// Seal a one-time key to the server's X25519 public [`Key`] and
    /// encrypt under it.
    Sealed(&'a Key),
}

/// Serializes and encrypts a license request into a framed byte vector.
pub fn encode_request(
    request: &LicenseRequest,
    protection: RequestProtection<'_>,
) -> LicenseResult<Vec<u8>> {
    let payload = Zeroizing::new(serde_json::to_vec(request)?);

    let mut out = Vec::new();
    encode_header(REQUEST_MAGIC, &mut out);
    match protection {
        RequestProtection::Symmetric(key) => {
            let blob = encrypt(key, &payload)?;
            out.push(TAG_SYMMETRIC);
            out.extend_from_slice(&blob.to_bytes());
        }
        RequestProtection::Sealed(server_public) => {
            let one_time = Key::generate_symmetric();
            let sealed = seal_key(&one_time, server_public)?;
            let blob = encrypt(&one_time, &payload)?;

            let sealed_bytes = sealed.to_bytes();
            let sealed_len = u16::try_from(sealed_bytes.len()).map_err(|_| {
                LicenseFormatError::Corrupted("sealed key too large".to_string())
            })?;
            out.push(TAG_SEALED);
            out.extend_from_slice(&sealed_len.to_le_bytes());
            out.extend_from_slice(&sealed_bytes);
            out.extend_from_slice(&blob.to_bytes());
        }
    }
    Ok(out)
}

/// Parses and decrypts a framed license request.
///
/// `key` must match the frame's protection tag: the pre-shared symmetric
/// key for symmetric frames, the server's X25519 private key for sealed
/// frames.
pub fn decode_request(bytes: &[u8], key: &Key) -> LicenseResult<LicenseRequest> {
    let payload = decode_header(bytes, REQUEST_MAGIC)?;
    let (&tag, rest) = payload.split_first().ok_or(LicenseFormatError::TooShort {
        min: HEADER_LEN + 1,
        actual: bytes.len(),
    })?;

    let plaintext = match tag {
        TAG_SYMMETRIC => {
            let blob = EncryptedBlob::from_bytes(rest)
                .map_err(|e| LicenseFormatError::Corrupted(e.to_string()))?;
            Zeroizing::new(decrypt(key, &blob)?)
        }
        TAG_SEALED => {
            if key.kind() != KeyKind::Private {
                return Err(signet_keys::KeyError::WrongKind {
                    expected: KeyKind::Private,
                    actual: key.kind(),
                }
                .into());
            }
            if rest.len() < 2 {
                return Err(LicenseFormatError::Corrupted(
                    "missing sealed key length".to_string(),
                )
                .into());
            }
            let sealed_len = u16::from_le_bytes([rest[0], rest[1]]) as usize;
            let rest = &rest[2..];
            if rest.len() < sealed_len {
                return Err(LicenseFormatError::Corrupted(
                    "sealed key length exceeds frame".to_string(),
                )
                .into());
            }
            let sealed = SealedKey::from_bytes(&rest[..sealed_len])
                .map_err(|e| LicenseFormatError::Corrupted(e.to_string()))?;
            let blob = EncryptedBlob::from_bytes(&rest[sealed_len..])
                .map_err(|e| LicenseFormatError::Corrupted(e.to_string()))?;

            let one_time = unseal_key(&sealed, key)?;
            Zeroizing::new(decrypt(&one_time, &blob)?)
        }
        other => {
            return Err(LicenseFormatError::Corrupted(format!(
                "unknown protection tag 0x{other:02x}"
            ))
            .into())
        }
    };

    let request = serde_json::from_slice(&plaintext)
        .map_err(|e| LicenseFormatError::Corrupted(e.to_string()))?;
    Ok(request)
}
