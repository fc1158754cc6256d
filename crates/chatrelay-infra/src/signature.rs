//! `X-Hub-Signature-256` verification for inbound webhook deliveries.
//!
//! Meta signs every POST body with the app secret and sends the result as
//! `sha256=<hex>`. Verification is constant-time via `hmac`'s `verify_slice`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use chatrelay_types::error::EventError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Verify a hex-encoded HMAC-SHA256 signature of `body`.
pub fn verify_hmac_sha256(secret: &[u8], body: &[u8], signature_hex: &str) -> Result<(), EventError> {
    let expected = hex_decode(signature_hex)
        .ok_or_else(|| EventError::BadSignature("signature is not valid hex".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| EventError::BadSignature(format!("invalid key: {e}")))?;
    mac.update(body);

    mac.verify_slice(&expected)
        .map_err(|_| EventError::BadSignature("signature mismatch".to_string()))
}

/// Verify the value of an `X-Hub-Signature-256` header.
///
/// A missing header fails verification. The `sha256=` prefix is optional.
pub fn verify_signature_header(
    secret: &[u8],
    body: &[u8],
    header: Option<&str>,
) -> Result<(), EventError> {
    let header = header
        .ok_or_else(|| EventError::BadSignature("missing X-Hub-Signature-256 header".to_string()))?;
    let hex_sig = header.strip_prefix("sha256=").unwrap_or(header);
    verify_hmac_sha256(secret, body, hex_sig.trim())
}

/// Compute the `sha256=<hex>` header value for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, EventError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| EventError::BadSignature(format!("invalid key: {e}")))?;
    mac.update(body);
    Ok(format!("sha256={}", hex_encode(&mac.finalize().into_bytes())))
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"app-secret";
    const BODY: &[u8] = br#"{"entry":[]}"#;

    #[test]
    fn test_sign_then_verify() {
        let header = sign(SECRET, BODY).unwrap();
        assert!(header.starts_with("sha256="));
        assert!(verify_signature_header(SECRET, BODY, Some(&header)).is_ok());
    }

    #[test]
    fn test_prefix_is_optional() {
        let header = sign(SECRET, BODY).unwrap();
        let bare = header.trim_start_matches("sha256=");
        assert!(verify_signature_header(SECRET, BODY, Some(bare)).is_ok());
    }

    #[test]
    fn test_missing_header_fails() {
        let err = verify_signature_header(SECRET, BODY, None).unwrap_err();
        assert!(matches!(err, EventError::BadSignature(_)));
    }

    #[test]
    fn test_tampered_body_fails() {
        let header = sign(SECRET, BODY).unwrap();
        assert!(verify_signature_header(SECRET, br#"{"entry":[{}]}"#, Some(&header)).is_err());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let header = sign(b"other-secret", BODY).unwrap();
        assert!(verify_signature_header(SECRET, BODY, Some(&header)).is_err());
    }

    #[test]
    fn test_invalid_hex() {
        assert!(verify_hmac_sha256(SECRET, BODY, "not-hex").is_err());
        assert!(verify_hmac_sha256(SECRET, BODY, "zz").is_err());
        assert!(verify_hmac_sha256(SECRET, BODY, "é0").is_err());
    }

    // RFC 4231 test case 2
    #[test]
    fn test_rfc4231_vector() {
        let expected = "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";
        let header = sign(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(header, format!("sha256={expected}"));
        assert!(verify_hmac_sha256(b"Jefe", b"what do ya want for nothing?", expected).is_ok());
    }
}
