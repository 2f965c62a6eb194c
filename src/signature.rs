//! Signature primitives for the external integrations: HMAC verification for
//! inbound webhooks and md5 request signing for the topup provider API.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`.
pub fn hmac_sha256_hex(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 signature in constant time.
pub fn verify_hmac_sha256(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

/// Hex-encoded HMAC-SHA1 of `payload` under `secret`.
pub fn hmac_sha1_hex(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA1 signature in constant time.
/// Accepts the `sha1=` prefix used by the provider's push channel.
pub fn verify_hmac_sha1(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let signature_hex = signature_hex
        .trim()
        .strip_prefix("sha1=")
        .unwrap_or(signature_hex.trim());
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

/// Hex-encoded md5 digest, the signing scheme the topup provider requires:
/// `md5(username + api_key + salt)`.
pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_roundtrip_verifies() {
        let secret = "shared-secret";
        let payload = br#"{"order_id":"HRM-000001-INV","transaction_status":"settlement"}"#;
        let sig = hmac_sha256_hex(secret, payload);
        assert!(verify_hmac_sha256(secret, payload, &sig));
    }

    #[test]
    fn sha256_rejects_altered_payload() {
        let secret = "shared-secret";
        let payload = b"payload-a";
        let sig = hmac_sha256_hex(secret, payload);
        assert!(!verify_hmac_sha256(secret, b"payload-b", &sig));
    }

    #[test]
    fn sha256_rejects_malformed_hex() {
        assert!(!verify_hmac_sha256("secret", b"payload", "not-hex"));
        assert!(!verify_hmac_sha256("secret", b"payload", ""));
    }

    #[test]
    fn sha1_accepts_prefixed_signatures() {
        let secret = "provider-secret";
        let payload = br#"{"data":{"ref_id":"HRM-000001-INV","status":"Sukses"}}"#;
        let sig = hmac_sha1_hex(secret, payload);
        assert!(verify_hmac_sha1(secret, payload, &sig));
        assert!(verify_hmac_sha1(secret, payload, &format!("sha1={sig}")));
        assert!(!verify_hmac_sha1(secret, payload, "sha1=deadbeef"));
    }

    #[test]
    fn md5_matches_known_vector() {
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }
}
