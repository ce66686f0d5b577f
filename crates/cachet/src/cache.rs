// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The base cache wrapping a single store.

use std::marker::PhantomData;

use async_trait::async_trait;

use cachet_store::{Error, InvalidateOptions, Options, Store};

use crate::{CacheInterface, CacheKey};

/// Type identifier returned by [`Cache::cache_type`].
pub const CACHE_TYPE: &str = "cache";

/// A typed cache over a single store.
///
/// `Cache` translates typed operations into store operations: the key is
/// hashed to its stable fingerprint, options pass through unchanged, and the
/// store's errors come back unchanged. It is the innermost layer of every
/// composition; decorators wrap it (or each other) through
/// [`CacheInterface`].
///
/// # Examples
///
/// ```
/// use cachet::{Cache, CacheInterface};
/// use cachet_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachet::Error> {
/// let cache = Cache::new(MemoryStore::<String>::new());
///
/// cache.set(&"answer", "42".to_string(), None).await?;
/// assert_eq!(cache.get(&"answer").await?, "42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cache<K, V, S> {
    store: S,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, S> Cache<K, V, S>
where
    S: Store<V>,
{
    /// Creates a cache over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    ///
    /// This allows accessing store-specific functionality not exposed by the
    /// cache contract.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the cache and returns the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}

#[async_trait]
impl<K, V, S> CacheInterface<K, V> for Cache<K, V, S>
where
    K: CacheKey,
    V: Send + Sync + 'static,
    S: Store<V>,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        self.store.get(&key.fingerprint()).await
    }

    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error> {
        self.store.set(&key.fingerprint(), value, options).await
    }

    async fn delete(&self, key: &K) -> Result<(), Error> {
        self.store.delete(&key.fingerprint()).await
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        self.store.invalidate(options).await
    }

    async fn clear(&self) -> Result<(), Error> {
        self.store.clear().await
    }

    fn cache_type(&self) -> &'static str {
        CACHE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_store::testing::{MockStore, StoreOp};

    #[tokio::test]
    async fn get_hashes_the_key_before_delegating() {
        let store = MockStore::<String>::new();
        let cache = Cache::<&str, String, _>::new(store.clone());

        let fingerprint = "my-key".fingerprint();
        store.set(&fingerprint, "my-value".to_owned(), None).await.unwrap();
        store.clear_operations();

        let value = cache.get(&"my-key").await.unwrap();
        assert_eq!(value, "my-value");
        assert_eq!(store.operations(), vec![StoreOp::Get(fingerprint)]);
    }

    #[tokio::test]
    async fn set_passes_options_through_unchanged() {
        let store = MockStore::<String>::new();
        let cache = Cache::<&str, String, _>::new(store.clone());

        let options = Options::new().with_cost(8).with_tags(["tag1"]);
        cache.set(&"my-key", "my-value".to_owned(), Some(options.clone())).await.unwrap();

        assert_eq!(
            store.operations(),
            vec![StoreOp::Set {
                key: "my-key".fingerprint(),
                value: "my-value".to_owned(),
                options: Some(options),
            }]
        );
    }

    #[tokio::test]
    async fn miss_propagates_the_store_error() {
        let store = MockStore::<String>::new();
        let cache = Cache::<&str, String, _>::new(store);

        let err = cache.get(&"absent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_and_clear_delegate() {
        let store = MockStore::<String>::new();
        let cache = Cache::<&str, String, _>::new(store.clone());

        cache.delete(&"my-key").await.unwrap();
        cache.clear().await.unwrap();

        assert_eq!(
            store.operations(),
            vec![StoreOp::Delete("my-key".fingerprint()), StoreOp::Clear]
        );
    }

    #[tokio::test]
    async fn invalidate_delegates_the_selector() {
        let store = MockStore::<String>::new();
        let cache = Cache::<&str, String, _>::new(store.clone());

        let options = InvalidateOptions::tags(["tag1"]);
        cache.invalidate(options.clone()).await.unwrap();

        assert_eq!(store.operations(), vec![StoreOp::Invalidate(options)]);
    }

    #[test]
    fn cache_type_is_the_documented_constant() {
        let cache = Cache::<&str, String, _>::new(MockStore::<String>::new());
        assert_eq!(cache.cache_type(), "cache");
    }
}
