// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tiered cache decorator with upward back-population on hit.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cachet_store::{Error, InvalidateOptions, Options};

use crate::{CacheInterface, CacheKey};

/// Type identifier returned by [`ChainCache::cache_type`].
pub const CHAIN_TYPE: &str = "chain";

/// An ordered tier of caches behind a single cache surface.
///
/// Reads walk the tiers in order; the first hit wins, and every tier in
/// front of it is synchronously back-populated with the value (best-effort,
/// so a degraded closer tier never masks a valid hit from a farther one).
/// Writes fan out to every tier.
///
/// Earlier tiers are the "closer" ones: a typical chain puts an in-process
/// memory cache first and a distributed backend last.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cachet::{Cache, CacheInterface, ChainCache};
/// use cachet_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachet::Error> {
/// let near = Arc::new(Cache::new(MemoryStore::<String>::new()));
/// let far = Arc::new(Cache::new(MemoryStore::<String>::new()));
/// let chain: ChainCache<&str, String> = ChainCache::new(vec![near, far]);
///
/// chain.set(&"my-key", "my-value".to_owned(), None).await?;
/// assert_eq!(chain.get(&"my-key").await?, "my-value");
/// # Ok(())
/// # }
/// ```
pub struct ChainCache<K, V> {
    caches: Vec<Arc<dyn CacheInterface<K, V>>>,
}

impl<K, V> std::fmt::Debug for ChainCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCache").field("tiers", &self.caches.len()).finish()
    }
}

impl<K, V> ChainCache<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a chain over the given caches, in order of consultation.
    pub fn new(caches: Vec<Arc<dyn CacheInterface<K, V>>>) -> Self {
        Self { caches }
    }

    /// Back-populates every tier in front of the one that produced the hit.
    ///
    /// Errors are ignored so a degraded closer tier does not fail the read.
    async fn set_until(&self, key: &K, value: &V, until: usize) {
        for cache in &self.caches[..until] {
            if let Err(error) = cache.set(key, value.clone(), None).await {
                debug!(%error, cache_type = cache.cache_type(), "chain backfill failed");
            }
        }
    }
}

#[async_trait]
impl<K, V> CacheInterface<K, V> for ChainCache<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        let mut last = CHAIN_TYPE;
        for (position, cache) in self.caches.iter().enumerate() {
            match cache.get(key).await {
                Ok(value) => {
                    self.set_until(key, &value, position).await;
                    return Ok(value);
                }
                Err(error) => {
                    last = cache.cache_type();
                    debug!(%error, cache_type = last, "chain tier miss");
                }
            }
        }

        Err(Error::ChainMiss { last: last.to_owned() })
    }

    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error> {
        let mut first_error = None;
        for cache in &self.caches {
            if let Err(error) = cache.set(key, value.clone(), options.clone()).await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn delete(&self, key: &K) -> Result<(), Error> {
        let mut first_error = None;
        for cache in &self.caches {
            if let Err(error) = cache.delete(key).await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        let mut first_error = None;
        for cache in &self.caches {
            if let Err(error) = cache.invalidate(options.clone()).await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn clear(&self) -> Result<(), Error> {
        let mut first_error = None;
        for cache in &self.caches {
            if let Err(error) = cache.clear().await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn cache_type(&self) -> &'static str {
        CHAIN_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CacheOp, MockCache};

    fn chain_of(
        tiers: &[&MockCache<&'static str, String>],
    ) -> ChainCache<&'static str, String> {
        ChainCache::new(
            tiers
                .iter()
                .map(|tier| Arc::new((*tier).clone()) as Arc<dyn CacheInterface<&'static str, String>>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn hit_in_the_first_tier_touches_nothing_else() {
        let near = MockCache::new();
        let far = MockCache::new();
        near.set(&"my-key", "my-value".to_owned(), None).await.unwrap();
        near.clear_operations();

        let chain = chain_of(&[&near, &far]);

        let value = chain.get(&"my-key").await.unwrap();
        assert_eq!(value, "my-value");
        assert_eq!(near.operations(), vec![CacheOp::Get("my-key")]);
        assert!(far.operations().is_empty());
    }

    #[tokio::test]
    async fn hit_in_a_later_tier_backfills_every_earlier_tier_before_returning() {
        let first = MockCache::new();
        let second = MockCache::new();
        let third = MockCache::new();
        third.set(&"my-key", "my-value".to_owned(), None).await.unwrap();
        third.clear_operations();

        let chain = chain_of(&[&first, &second, &third]);

        let value = chain.get(&"my-key").await.unwrap();
        assert_eq!(value, "my-value");

        let backfill = CacheOp::Set {
            key: "my-key",
            value: "my-value".to_owned(),
            options: None,
        };
        assert_eq!(first.operations(), vec![CacheOp::Get("my-key"), backfill.clone()]);
        assert_eq!(second.operations(), vec![CacheOp::Get("my-key"), backfill]);
        assert_eq!(third.operations(), vec![CacheOp::Get("my-key")]);
    }

    #[tokio::test]
    async fn backfill_errors_do_not_fail_the_read() {
        let near = MockCache::new();
        let far = MockCache::new();
        far.set(&"my-key", "my-value".to_owned(), None).await.unwrap();
        near.fail_when(|op| matches!(op, CacheOp::Set { .. }));

        let chain = chain_of(&[&near, &far]);

        let value = chain.get(&"my-key").await.unwrap();
        assert_eq!(value, "my-value");
    }

    #[tokio::test]
    async fn all_miss_names_the_last_consulted_cache() {
        let near = MockCache::new();
        let far = MockCache::new().with_cache_type("redis");

        let chain = chain_of(&[&near, &far]);

        let err = chain.get(&"my-key").await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            Error::ChainMiss { last } => assert_eq!(last, "redis"),
            other => panic!("expected a chain miss, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_fans_out_to_every_tier() {
        let near = MockCache::new();
        let far = MockCache::new();
        let chain = chain_of(&[&near, &far]);

        chain.set(&"my-key", "my-value".to_owned(), None).await.unwrap();

        let write = CacheOp::Set {
            key: "my-key",
            value: "my-value".to_owned(),
            options: None,
        };
        assert_eq!(near.operations(), vec![write.clone()]);
        assert_eq!(far.operations(), vec![write]);
    }

    #[tokio::test]
    async fn set_reaches_every_tier_even_when_one_fails_and_reports_the_first_error() {
        let near = MockCache::new();
        let far = MockCache::new();
        near.fail_when(|op| matches!(op, CacheOp::Set { .. }));

        let chain = chain_of(&[&near, &far]);

        let err = chain.set(&"my-key", "my-value".to_owned(), None).await.unwrap_err();
        assert!(!err.is_not_found());

        // The failing tier did not stop the fan-out.
        assert_eq!(far.operations().len(), 1);
    }

    #[tokio::test]
    async fn delete_invalidate_and_clear_fan_out() {
        let near = MockCache::new();
        let far = MockCache::new();
        let chain = chain_of(&[&near, &far]);

        chain.delete(&"my-key").await.unwrap();
        let options = InvalidateOptions::tags(["tag1"]);
        chain.invalidate(options.clone()).await.unwrap();
        chain.clear().await.unwrap();

        let expected = vec![
            CacheOp::Delete("my-key"),
            CacheOp::Invalidate(options),
            CacheOp::Clear,
        ];
        assert_eq!(near.operations(), expected);
        assert_eq!(far.operations(), expected);
    }

    #[test]
    fn cache_type_is_the_documented_constant() {
        let chain = chain_of(&[]);
        assert_eq!(chain.cache_type(), "chain");
    }
}
