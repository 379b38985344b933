use md5::{Digest, Md5};
use std::fs;
use std::path::Path;

use crate::error::{CrackError, Result};

/// Hex length of an MD5 digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// The 128-bit digest being searched for. Immutable for the duration of a
/// run; the hash behind it is treated as an opaque one-way function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDigest {
    bytes: [u8; 16],
}

impl TargetDigest {
    /// Parse a 32-character hex string, case-insensitive. Anything else is
    /// rejected before a search ever starts.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        if normalized.len() != DIGEST_HEX_LEN {
            return Err(CrackError::InvalidDigestFormat(format!(
                "expected {} hex characters, got {}",
                DIGEST_HEX_LEN,
                normalized.len()
            )));
        }
        let decoded = hex::decode(&normalized).map_err(|e| {
            CrackError::InvalidDigestFormat(format!("not a hex string: {}", e))
        })?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&decoded);
        Ok(TargetDigest { bytes })
    }

    /// Read the digest from a file containing the hex string (surrounding
    /// whitespace tolerated).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Hash a candidate's UTF-8 bytes and compare against the target.
    pub fn matches(&self, candidate: &str) -> bool {
        let digest = Md5::digest(candidate.as_bytes());
        digest.as_slice() == &self.bytes[..]
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Digest of an arbitrary plaintext. Handy for self-tests and for
    /// deriving a target from a known password.
    pub fn of(plaintext: &str) -> Self {
        let digest = Md5::digest(plaintext.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        TargetDigest { bytes }
    }
}

impl std::fmt::Display for TargetDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // md5("abc"), a fixed reference vector.
    const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";

    #[test]
    fn test_parse_valid_digest() {
        let digest = TargetDigest::parse(ABC_MD5).unwrap();
        assert_eq!(digest.to_hex(), ABC_MD5);
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let digest = TargetDigest::parse(&format!("  {}\n", ABC_MD5.to_uppercase())).unwrap();
        assert_eq!(digest.to_hex(), ABC_MD5);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        let err = TargetDigest::parse("abc123").unwrap_err();
        assert!(matches!(err, CrackError::InvalidDigestFormat(_)));
    }

    #[test]
    fn test_parse_rejects_non_hex_characters() {
        let bad = "g00150983cd24fb0d6963f7d28e17f72";
        let err = TargetDigest::parse(bad).unwrap_err();
        assert!(matches!(err, CrackError::InvalidDigestFormat(_)));
    }

    #[test]
    fn test_matches() {
        let digest = TargetDigest::parse(ABC_MD5).unwrap();
        assert!(digest.matches("abc"));
        assert!(!digest.matches("abd"));
        assert!(!digest.matches(""));
    }

    #[test]
    fn test_of_round_trips_with_matches() {
        let digest = TargetDigest::of("hunter2");
        assert!(digest.matches("hunter2"));
        assert!(!digest.matches("hunter3"));
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join("ettubrute-digest-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("target.txt");
        std::fs::write(&path, format!("{}\n", ABC_MD5)).unwrap();

        let digest = TargetDigest::from_file(&path).unwrap();
        assert!(digest.matches("abc"));
    }
}
