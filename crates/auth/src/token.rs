//! Bearer-key hashing.
//!
//! Agents authenticate with an opaque bearer key; only its SHA-256 digest is
//! ever stored or compared against (spec §3 `Agent.agentKeyHash`), so the
//! raw key never appears in the store, logs, or events.

use sha2::{Digest, Sha256};

pub fn hash_bearer_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let digest = hasher.finalize();
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(&mut out, "{b:02x}").expect("writing to a String cannot fail");
    }
    out
}

/// Extract the raw token from an `Authorization: Bearer <token>` header
/// value. Grounded on `gate::bin::server::auth_middleware`'s header parsing.
pub fn parse_bearer_header(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_hex() {
        let a = hash_bearer_key("secret-key");
        let b = hash_bearer_key("secret-key");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_keys_hash_differently() {
        assert_ne!(hash_bearer_key("a"), hash_bearer_key("b"));
    }

    #[test]
    fn parse_bearer_header_rejects_malformed() {
        assert_eq!(parse_bearer_header("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_header("Bearer "), None);
        assert_eq!(parse_bearer_header("Basic abc"), None);
    }
}
