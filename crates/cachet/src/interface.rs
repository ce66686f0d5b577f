// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The uniform contract implemented by the cache and every decorator.

use async_trait::async_trait;

use cachet_store::{Error, InvalidateOptions, Options};

/// Typed cache operations.
///
/// The base [`Cache`](crate::Cache) implements this trait by hashing keys
/// and delegating to a store; decorators implement it by wrapping another
/// `CacheInterface`, which is what makes them freely composable. Decorators
/// hold their inner tiers as `Arc<dyn CacheInterface<K, V>>`, so any
/// implementation can slot into any position of a composition.
#[async_trait]
pub trait CacheInterface<K, V>: Send + Sync {
    /// Retrieves the value cached under `key`.
    ///
    /// A miss is always an error; see [`Error::is_not_found`].
    async fn get(&self, key: &K) -> Result<V, Error>;

    /// Caches `value` under `key`.
    ///
    /// `None` options fall back to the underlying store's defaults.
    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error>;

    /// Removes the value cached under `key`.
    async fn delete(&self, key: &K) -> Result<(), Error>;

    /// Removes every value indexed under the selector's tags.
    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error>;

    /// Removes every value.
    async fn clear(&self) -> Result<(), Error>;

    /// Returns the stable identifier of this cache or decorator kind.
    fn cache_type(&self) -> &'static str;
}
