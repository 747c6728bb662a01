//! Content hash for proposal bodies.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte Blake2b digest of a proposal's text and action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a sequence of fields. Each field is length-prefixed so that
    /// `["ab", "c"]` and `["a", "bc"]` produce different digests.
    pub fn digest<'a>(fields: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Blake2b256::new();
        for field in fields {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_length_prefixed() {
        let a = ContentHash::digest([b"ab".as_slice(), b"c".as_slice()]);
        let b = ContentHash::digest([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_deterministic() {
        let a = ContentHash::digest([b"title".as_slice()]);
        let b = ContentHash::digest([b"title".as_slice()]);
        assert_eq!(a, b);
        assert!(!a.is_zero());
        assert_eq!(a.to_string().len(), 64);
    }
}
