//! Structural hashing of textual representations.
//!
//! Platform constraints compare by their normalized representation; a
//! [`ContentHash`] of that text lets them live in hash sets and maps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 hash of some canonical content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes a byte slice with XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Hashes the `Display` rendering of a value.
    pub fn of_display(value: &impl fmt::Display) -> Self {
        Self::from_bytes(value.to_string().as_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"Pins('1 2 3')");
        let b = ContentHash::from_bytes(b"Pins('1 2 3')");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(ContentHash::from_bytes(b"Pins('1')"), ContentHash::from_bytes(b"Pins('2')"));
    }

    #[test]
    fn of_display_matches_bytes() {
        assert_eq!(ContentHash::of_display(&42), ContentHash::from_bytes(b"42"));
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::from_bytes(b"test").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"IOStandard('LVCMOS33')");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
