// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache storage backends.
//!
//! [`Store`] defines the interface that all backend adapters implement.
//! Adapters receive keys that have already been hashed to their stable string
//! fingerprint; the typed cache layer sits above this trait and never talks
//! to a backend directly.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Error, InvalidateOptions, Options};

/// Trait for store adapter implementations.
///
/// Implement this trait to expose a backend through the uniform cache
/// contract. Every adapter also carries the tag-index protocol from the
/// [`tags`](crate::tags) module so that bulk invalidation works even on
/// backends with no native set type.
///
/// All operations are safe to call concurrently provided the underlying
/// backend client is itself concurrency-safe; adapters add no locking of
/// their own. Dropping a returned future abandons the operation, but work
/// already issued to the backend is not undone.
#[async_trait]
pub trait Store<V>: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// A missing key is always an error ([`Error::NotFound`] or the
    /// backend's own miss error), never a nil-like success.
    async fn get(&self, key: &str) -> Result<V, Error>;

    /// Retrieves the value and its remaining time to live.
    ///
    /// Backends that cannot observe a remaining TTL report
    /// [`Duration::ZERO`] alongside the value.
    async fn get_with_ttl(&self, key: &str) -> Result<(V, Duration), Error>;

    /// Stores `value` under `key`.
    ///
    /// When `options` is `None` the store's default [`Options`] apply.
    /// Honors `expiration`, `cost`, and `tags`; tagged writes additionally
    /// update the tag index. Index failures after a successful primary put
    /// do not fail the operation.
    async fn set(&self, key: &str, value: V, options: Option<Options>) -> Result<(), Error>;

    /// Removes a single key.
    async fn delete(&self, key: &str) -> Result<(), Error>;

    /// Removes every key indexed under the selector's tags, then the tag
    /// entries themselves.
    ///
    /// Invalidation is best-effort: missing tag entries are skipped and
    /// per-key deletion failures are swallowed. The operation succeeds once
    /// the tag walk completes.
    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error>;

    /// Removes all keys the backend owns.
    async fn clear(&self) -> Result<(), Error>;

    /// Returns the stable identifier of the backend kind.
    fn store_type(&self) -> &'static str;
}
