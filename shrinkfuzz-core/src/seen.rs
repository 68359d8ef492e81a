//! Fingerprint-based membership test used to avoid reclassifying an input.

use sha1::{Digest, Sha1};
use std::collections::HashSet;

/// First 4 bytes (big-endian) of the SHA-1 digest of `input`.
///
/// Collisions are tolerated: two distinct inputs may share a fingerprint,
/// in which case the rarer one is simply never classified. That can only
/// cost a potential improvement, never corrupt corpus state.
pub fn fingerprint(input: &[u8]) -> u32 {
    let mut hasher = Sha1::new();
    hasher.update(input);
    let digest = hasher.finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Approximate set of inputs already passed to the classifier.
#[derive(Debug, Default)]
pub struct SeenSet {
    fingerprints: HashSet<u32>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self {
            fingerprints: HashSet::new(),
        }
    }

    pub fn contains(&self, input: &[u8]) -> bool {
        self.fingerprints.contains(&fingerprint(input))
    }

    pub fn insert(&mut self, input: &[u8]) {
        self.fingerprints.insert(fingerprint(input));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_a_stable_fingerprint() {
        // sha1("") = da39a3ee5e6b4b0d3255bfef95601890afd80709
        assert_eq!(fingerprint(b""), 0xda39a3ee);
    }

    #[test]
    fn seen_set_remembers_inserted_inputs() {
        let mut seen = SeenSet::new();
        assert!(!seen.contains(b"hello"));
        seen.insert(b"hello");
        assert!(seen.contains(b"hello"));
        assert!(!seen.contains(b"world"));
    }
}
