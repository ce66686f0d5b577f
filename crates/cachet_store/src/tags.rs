// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tag-index protocol shared by every store adapter.
//!
//! A tag entry maps a tag name to the set of key fingerprints written with
//! that tag. It lives in the backend itself, under a fixed key derived from
//! the tag name, so the index survives wherever the data does. Two storage
//! strategies exist:
//!
//! - **Native set** — backends with a set type (Redis and its clustered
//!   variant) keep one member per fingerprint and refresh the set's TTL on
//!   every tagged write.
//! - **List-encoded** — all other backends store the fingerprints as a single
//!   comma-separated value. The [`TagList`] trait converts between that
//!   encoding and the backend's value type.
//!
//! Both strategies stay behind the [`Store`](crate::Store) contract, so the
//! layers above remain backend-oblivious.

use std::time::Duration;

/// Prefix of every tag entry key.
///
/// Kept byte-for-byte compatible with deployments written by earlier
/// implementations of this index; changing it would orphan live tag entries.
pub const TAG_KEY_PREFIX: &str = "gocache_tag_";

/// TTL applied to every tag entry: 720 hours.
pub const TAG_KEY_EXPIRY: Duration = Duration::from_secs(720 * 60 * 60);

/// Separator between fingerprints in a list-encoded tag entry.
///
/// There is no escaping; tag names and keys must not contain it.
pub const TAG_SEPARATOR: &str = ",";

/// Returns the backend key holding the entry for `tag`.
#[must_use]
pub fn tag_key(tag: &str) -> String {
    format!("{TAG_KEY_PREFIX}{tag}")
}

/// Encodes fingerprints into the list form.
#[must_use]
pub fn encode_list(keys: &[String]) -> String {
    keys.join(TAG_SEPARATOR)
}

/// Decodes a list-encoded entry into its fingerprints, dropping empty
/// segments.
#[must_use]
pub fn decode_list(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Appends `key` to `keys` unless it is already present.
///
/// Returns `true` when the list changed.
pub fn merge_key(keys: &mut Vec<String>, key: &str) -> bool {
    if keys.iter().any(|existing| existing == key) {
        return false;
    }
    keys.push(key.to_owned());
    true
}

/// Conversion between a backend value and a list-encoded tag entry.
///
/// List-strategy adapters store tag entries as ordinary values, so their
/// value type must be able to round-trip a fingerprint list. Implementations
/// are provided for `String` and `Vec<u8>`; a custom value type only needs
/// this trait when it is used with tags on a list-strategy backend.
pub trait TagList: Sized {
    /// Encodes fingerprints into a backend value.
    fn encode_tag_list(keys: &[String]) -> Self;

    /// Decodes a backend value into fingerprints.
    ///
    /// Returns `None` when the value does not hold a readable list.
    fn decode_tag_list(&self) -> Option<Vec<String>>;
}

impl TagList for String {
    fn encode_tag_list(keys: &[String]) -> Self {
        encode_list(keys)
    }

    fn decode_tag_list(&self) -> Option<Vec<String>> {
        Some(decode_list(self))
    }
}

impl TagList for Vec<u8> {
    fn encode_tag_list(keys: &[String]) -> Self {
        encode_list(keys).into_bytes()
    }

    fn decode_tag_list(&self) -> Option<Vec<String>> {
        std::str::from_utf8(self).ok().map(decode_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_key_applies_prefix() {
        assert_eq!(tag_key("tag1"), "gocache_tag_tag1");
    }

    #[test]
    fn tag_key_expiry_is_720_hours() {
        assert_eq!(TAG_KEY_EXPIRY, Duration::from_secs(2_592_000));
    }

    #[test]
    fn list_round_trip() {
        let keys = vec!["a23fdf987h2svc23".to_owned(), "jHG2372x38hf74".to_owned()];
        let encoded = encode_list(&keys);
        assert_eq!(encoded, "a23fdf987h2svc23,jHG2372x38hf74");
        assert_eq!(decode_list(&encoded), keys);
    }

    #[test]
    fn decode_drops_empty_segments() {
        assert!(decode_list("").is_empty());
        assert_eq!(decode_list("a,,b"), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn merge_key_deduplicates() {
        let mut keys = vec!["my-key".to_owned()];
        assert!(!merge_key(&mut keys, "my-key"));
        assert!(merge_key(&mut keys, "a-second-key"));
        assert_eq!(keys, vec!["my-key".to_owned(), "a-second-key".to_owned()]);
    }

    #[test]
    fn byte_values_round_trip() {
        let keys = vec!["k1".to_owned(), "k2".to_owned()];
        let encoded = Vec::<u8>::encode_tag_list(&keys);
        assert_eq!(encoded.decode_tag_list(), Some(keys));
    }

    #[test]
    fn invalid_utf8_bytes_decode_to_none() {
        let raw = vec![0xff, 0xfe];
        assert_eq!(raw.decode_tag_list(), None);
    }
}
