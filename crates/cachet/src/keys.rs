// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Stable string fingerprints for arbitrary cache keys.

use std::hash::{Hash, Hasher};

use sha2::{Digest, Sha256};

/// A key that can be reduced to a stable string fingerprint.
///
/// The fingerprint is what store adapters receive as the backend-level key.
/// It is deterministic: equal keys always produce the same fingerprint, and
/// the encoding (lowercase hex of a SHA-256 digest) is stable across
/// processes, so entries written by one deployment remain addressable by the
/// next.
///
/// A blanket implementation covers every `Hash` type, which makes tuples,
/// strings, integers, and user-defined `#[derive(Hash)]` structs usable as
/// cache keys without further ceremony.
///
/// # Examples
///
/// ```
/// use cachet::CacheKey;
///
/// let fingerprint = "my-key".fingerprint();
/// assert_eq!(fingerprint, "my-key".to_owned().fingerprint());
/// assert_eq!(fingerprint.len(), 64);
/// ```
pub trait CacheKey: Send + Sync {
    /// Returns the fingerprint used as the backend-level key.
    fn fingerprint(&self) -> String;
}

impl<K> CacheKey for K
where
    K: Hash + Send + Sync,
{
    fn fingerprint(&self) -> String {
        let mut digest = FingerprintHasher(Sha256::new());
        self.hash(&mut digest);
        hex::encode(digest.0.finalize())
    }
}

/// Feeds the `Hash` byte stream into SHA-256.
struct FingerprintHasher(Sha256);

impl Hasher for FingerprintHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(&self) -> u64 {
        // The full digest is read through `finalize`; `Hash` only calls `write`.
        0
    }
}
