//! Cryptographic utilities for session tokens and CSRF signing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a session token (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
///
/// Session tokens are only ever stored in this hashed form.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random URL-safe token from `len` bytes of OS randomness.
pub fn generate_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a new session token.
pub fn generate_session_token() -> String {
    generate_token(SESSION_TOKEN_BYTES)
}

/// Signs `message` with HMAC-SHA256 and returns the tag as hex.
pub fn hmac_sha256_hex(key: &[u8], message: &str) -> String {
    // HMAC accepts keys of any length, new_from_slice cannot fail for it.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex HMAC-SHA256 tag in constant time.
pub fn verify_hmac_sha256_hex(key: &[u8], message: &str, tag_hex: &str) -> bool {
    let Ok(tag) = hex::decode(tag_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_generate_session_token_length() {
        // 32 bytes -> 43 base64 chars without padding
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_token_is_random() {
        let a = generate_token(16);
        let b = generate_token(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hmac_roundtrip() {
        let key = b"0123456789abcdef0123456789abcdef";
        let tag = hmac_sha256_hex(key, "nonce-value");
        assert_eq!(tag.len(), 64);
        assert!(verify_hmac_sha256_hex(key, "nonce-value", &tag));
    }

    #[test]
    fn test_hmac_rejects_other_message() {
        let key = b"0123456789abcdef0123456789abcdef";
        let tag = hmac_sha256_hex(key, "nonce-value");
        assert!(!verify_hmac_sha256_hex(key, "other-nonce", &tag));
    }

    #[test]
    fn test_hmac_rejects_other_key() {
        let tag = hmac_sha256_hex(b"key-one", "nonce");
        assert!(!verify_hmac_sha256_hex(b"key-two", "nonce", &tag));
    }

    #[test]
    fn test_hmac_rejects_garbage_tag() {
        assert!(!verify_hmac_sha256_hex(b"key", "nonce", "not-hex"));
        assert!(!verify_hmac_sha256_hex(b"key", "nonce", ""));
    }
}
