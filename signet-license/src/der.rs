//! Raw ↔ DER signature transcoding.
//!
//! Previously issued licenses carry their (r, s) signature pair wrapped in
//! an ASN.1 DER `SEQUENCE` of two `INTEGER`s. New signatures are raw
//! 64-byte values; the verify path accepts both, transcoding DER input
//! through [`der_to_raw`].
//!
//! Encoding follows standard DER sign-avoidance: each integer is the
//! minimal big-endian byte string, with a single `0x00` prepended when the
//! most significant bit is set. Decoding is strict: structural violations
//! always fail with [`LicenseError::InvalidSignatureFormat`], never a
//! panic.

use crate::error::{LicenseError, LicenseResult};

/// Size of a raw (r || s) signature in bytes.
pub const RAW_SIGNATURE_SIZE: usize = 64;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

// Two-byte long form is the ceiling; `decode` rejects anything longer,
// and signature integers are tiny (33 bytes at most for padded Ed25519
// halves).
fn push_length(len: usize, out: &mut Vec<u8>) {
    debug_assert!(len <= 0xFFFF, "length {len} exceeds the supported DER long form");
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xFF {
        out.push(0x81);
        out.push(len as u8);
    } else {
        out.push(0x82);
        out.push((len >> 8) as u8);
        out.push(len as u8);
    }
}

fn push_integer(bytes: &[u8], out: &mut Vec<u8>) {
    // Minimal form: drop leading zeros, but keep one byte for zero itself.
    let mut start = 0;
    while start < bytes.len().saturating_sub(1) && bytes[start] == 0 {
        start += 1;
    }
    let minimal = if bytes.is_empty() { &[0u8][..] } else { &bytes[start..] };

    let pad = minimal[0] & 0x80 != 0;
    out.push(TAG_INTEGER);
    push_length(minimal.len() + usize::from(pad), out);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(minimal);
}

/// Encodes an (r, s) pair as a DER `SEQUENCE` of two `INTEGER`s.
///
/// Supports integers up to 65 533 bytes (the two-byte long-form length
/// ceiling, which is also what [`decode`] accepts); signature integers
/// are far below it.
#[must_use]
pub fn encode(r: &[u8], s: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(r.len() + s.len() + 8);
    push_integer(r, &mut body);
    push_integer(s, &mut body);

    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(TAG_SEQUENCE);
    push_length(body.len(), &mut out);
    out.extend_from_slice(&body);
    out
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self, what: &str) -> LicenseResult<u8> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| LicenseError::InvalidSignatureFormat(format!("truncated {what}")))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, len: usize, what: &str) -> LicenseResult<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|&e| e <= self.buf.len()).ok_or_else(
            || LicenseError::InvalidSignatureFormat(format!("{what} length exceeds buffer")),
        )?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn length(&mut self, what: &str) -> LicenseResult<usize> {
        let first = self.byte(what)?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        let count = (first & 0x7F) as usize;
        if count == 0 || count > 2 {
            return Err(LicenseError::InvalidSignatureFormat(format!(
                "unsupported {what} length encoding"
            )));
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.byte(what)? as usize;
        }
        Ok(len)
    }

    fn integer(&mut self) -> LicenseResult<Vec<u8>> {
        let tag = self.byte("integer tag")?;
        if tag != TAG_INTEGER {
            return Err(LicenseError::InvalidSignatureFormat(format!(
                "expected INTEGER tag, got 0x{tag:02x}"
            )));
        }
        let len = self.length("integer")?;
        if len == 0 {
            return Err(LicenseError::InvalidSignatureFormat(
                "empty integer".to_string(),
            ));
        }
        let content = self.take(len, "integer")?;
        // Strip the single sign-avoidance pad byte, if present.
        let value = if content.len() > 1 && content[0] == 0 {
            &content[1..]
        } else {
            content
        };
        Ok(value.to_vec())
    }
}

/// Decodes a DER `SEQUENCE` of two `INTEGER`s back into an (r, s) pair.
///
/// Returned integers are in minimal form (no sign padding, no leading
/// zeros).
///
/// # Errors
///
/// Any structural violation (wrong tag, truncated buffer, out-of-range
/// declared length, trailing garbage) fails with
/// [`LicenseError::InvalidSignatureFormat`].
pub fn decode(der: &[u8]) -> LicenseResult<(Vec<u8>, Vec<u8>)> {
    let mut reader = Reader { buf: der, pos: 0 };

    let tag = reader.byte("sequence tag")?;
    if tag != TAG_SEQUENCE {
        return Err(LicenseError::InvalidSignatureFormat(format!(
            "expected SEQUENCE tag, got 0x{tag:02x}"
        )));
    }
    let body_len = reader.length("sequence")?;
    if body_len != der.len().saturating_sub(reader.pos) {
        return Err(LicenseError::InvalidSignatureFormat(
            "sequence length does not match buffer".to_string(),
        ));
    }

    let r = reader.integer()?;
    let s = reader.integer()?;

    if reader.pos != der.len() {
        return Err(LicenseError::InvalidSignatureFormat(
            "trailing bytes after signature".to_string(),
        ));
    }
    Ok((r, s))
}

/// Wraps a raw 64-byte signature as DER, splitting it into r = first 32
/// bytes, s = last 32 bytes.
#[must_use]
pub fn raw_to_der(raw: &[u8; RAW_SIGNATURE_SIZE]) -> Vec<u8> {
    encode(&raw[..32], &raw[32..])
}

/// Unwraps a DER signature back into raw 64-byte form, left-padding each
/// integer to 32 bytes.
///
/// # Errors
///
/// Fails if the DER structure is invalid or either integer exceeds 32
/// bytes.
pub fn der_to_raw(der: &[u8]) -> LicenseResult<[u8; RAW_SIGNATURE_SIZE]> {
    let (r, s) = decode(der)?;
    let mut raw = [0u8; RAW_SIGNATURE_SIZE];
    let (r_half, s_half) = raw.split_at_mut(32);
    for (half, value) in [(r_half, &r), (s_half, &s)] {
        if value.len() > 32 {
            return Err(LicenseError::InvalidSignatureFormat(format!(
                "integer too large: {} bytes",
                value.len()
            )));
        }
        half[32 - value.len()..].copy_from_slice(value);
    }
    Ok(raw)
}
