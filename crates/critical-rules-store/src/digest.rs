//! # Content Digests
//!
//! SHA-256 over the raw UTF-8 bytes of the rules document, hex encoded in
//! lowercase. This is the exact digest the upstream publisher writes into the
//! `sha256` field of `version.json`, so no normalization is applied: a single
//! changed byte (including line endings) yields a different checksum.
//!
//! ## References
//!
//! - NIST FIPS 180-4 - "Secure Hash Standard (SHS)"
//!   <https://csrc.nist.gov/publications/detail/fips/180/4/final>

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 of `content`.
///
/// # Example
///
/// ```rust
/// use critical_rules_store::digest::sha256_hex;
///
/// assert_eq!(
///     sha256_hex("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares two hex checksums, ignoring case and surrounding whitespace.
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hex_length() {
        assert_eq!(sha256_hex("critical rules").len(), 64);
    }

    #[test]
    fn test_line_endings_matter() {
        assert_ne!(sha256_hex("a\nb"), sha256_hex("a\r\nb"));
    }

    #[test]
    fn test_case_insensitive_match() {
        let digest = sha256_hex("rules");
        assert!(checksums_match(&digest.to_uppercase(), &digest));
        assert!(checksums_match(&format!(" {digest}\n"), &digest));
        assert!(!checksums_match(&sha256_hex("other"), &digest));
    }
}
