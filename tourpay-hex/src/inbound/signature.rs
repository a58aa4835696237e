//! Gateway webhook signature verification.
//!
//! The gateway signs every notification with the shared webhook secret:
//!
//! ```text
//! x-signature: ts=1704908010,v1=618c85345248dd820d5fd456117c2ab2ef8eda45a0282ff693eac24131a5e839
//! ```
//!
//! `v1` is the hex HMAC-SHA256 of the manifest
//! `id:{data.id};request-id:{x-request-id};ts:{ts};`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing x-signature header")]
    Missing,

    #[error("malformed x-signature header")]
    Malformed,

    #[error("invalid webhook secret")]
    InvalidSecret,

    #[error("signature does not match")]
    Mismatch,
}

/// The two parts of an `x-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub ts: String,
    pub v1: String,
}

impl SignatureHeader {
    /// Parses `ts=..,v1=..`. Unknown keys are skipped, order does not matter.
    pub fn parse(raw: &str) -> Result<Self, SignatureError> {
        let mut ts = None;
        let mut v1 = None;

        for part in raw.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "ts" => ts = Some(value.trim().to_string()),
                "v1" => v1 = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (ts, v1) {
            (Some(ts), Some(v1)) if !ts.is_empty() && !v1.is_empty() => Ok(Self { ts, v1 }),
            _ => Err(SignatureError::Malformed),
        }
    }
}

/// Builds the string the gateway signs.
pub fn manifest(data_id: &str, request_id: &str, ts: &str) -> String {
    format!("id:{data_id};request-id:{request_id};ts:{ts};")
}

/// Hex HMAC-SHA256 of `manifest` under `secret`.
pub fn sign(secret: &str, manifest: &str) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(manifest.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a notification's `x-signature` header in constant time.
pub fn verify(
    secret: &str,
    header: Option<&str>,
    data_id: &str,
    request_id: &str,
) -> Result<(), SignatureError> {
    let header = SignatureHeader::parse(header.ok_or(SignatureError::Missing)?)?;
    let expected = sign(secret, &manifest(data_id, request_id, &header.ts))?;

    let provided = header.v1.to_ascii_lowercase();
    if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_tour_123";

    fn signed_header(data_id: &str, request_id: &str, ts: &str) -> String {
        let v1 = sign(SECRET, &manifest(data_id, request_id, ts)).unwrap();
        format!("ts={ts},v1={v1}")
    }

    #[test]
    fn test_manifest_layout() {
        assert_eq!(
            manifest("123", "req-9", "1704908010"),
            "id:123;request-id:req-9;ts:1704908010;"
        );
    }

    #[test]
    fn test_parse_header_in_any_order() {
        let header = SignatureHeader::parse("v1=abc, ts=42").unwrap();
        assert_eq!(header.ts, "42");
        assert_eq!(header.v1, "abc");

        assert_eq!(
            SignatureHeader::parse("ts=42"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            SignatureHeader::parse("garbage"),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let header = signed_header("987", "req-1", "1704908010");
        assert_eq!(verify(SECRET, Some(&header), "987", "req-1"), Ok(()));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let header = signed_header("987", "req-1", "1704908010");

        assert_eq!(
            verify(SECRET, Some(&header), "988", "req-1"),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify(SECRET, Some(&header), "987", "req-2"),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify("other_secret", Some(&header), "987", "req-1"),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify(SECRET, None, "987", "req-1"),
            Err(SignatureError::Missing)
        );
    }
}
