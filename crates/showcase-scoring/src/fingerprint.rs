// Certificate fingerprints: SHA-256 over RFC 8785 (JCS) canonical JSON

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 hash of the input bytes and returns it as a lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Canonicalizes a serializable value according to RFC 8785 (JCS) and returns the UTF-8 bytes.
///
/// Object keys are sorted and whitespace is dropped, so two payloads with the
/// same content always hash the same regardless of field order.
pub fn jcs_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let canonical = serde_jcs::to_string(value)?;
    Ok(canonical.into_bytes())
}

/// Fingerprint of a payload: `sha256(jcs(payload))` as lowercase hex.
pub fn fingerprint<T: Serialize>(payload: &T) -> Result<String> {
    Ok(sha256_hex(&jcs_canonical_bytes(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_canonical_bytes_sort_keys() {
        let value = serde_json::json!({"rank": 1, "name": "Alpha", "judges": ["b", "a"]});
        let canonical = String::from_utf8(jcs_canonical_bytes(&value).unwrap()).unwrap();
        // Keys are sorted, array order is preserved.
        assert_eq!(canonical, r#"{"judges":["b","a"],"name":"Alpha","rank":1}"#);
    }

    #[test]
    fn test_fingerprint_ignores_field_order() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"productId": "p1", "overallScore": 7.5}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"overallScore": 7.5, "productId": "p1"}"#).unwrap();

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = serde_json::json!({"overallScore": 7.5});
        let b = serde_json::json!({"overallScore": 7.6});
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = fingerprint(&serde_json::json!({"k": "v"})).unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }
}
