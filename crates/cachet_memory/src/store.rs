// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The moka-backed store implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use cachet_store::{Error, InvalidateOptions, Options, Store, TagList, tags};

use crate::builder::MemoryStoreBuilder;

/// Type identifier returned by [`MemoryStore::store_type`].
pub const MEMORY_TYPE: &str = "memory";

/// A stored value plus the metadata the store tracks per entry.
///
/// moka does not expose remaining TTLs, so the deadline lives in the entry
/// and expiry is checked lazily on read.
#[derive(Debug, Clone)]
struct MemoryEntry<V> {
    value: V,
    cost: i64,
    expires_at: Option<Instant>,
}

impl<V> MemoryEntry<V> {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    fn remaining_ttl(&self) -> Duration {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }
}

/// An in-process store backed by moka.
///
/// Supports per-entry expiration, cost-weighted capacity, and the
/// list-encoded tag index. Clones share the underlying cache.
///
/// # Examples
///
/// ```
/// use cachet_memory::MemoryStore;
/// use cachet_store::Store;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachet_store::Error> {
/// let store = MemoryStore::<String>::new();
///
/// store.set("key", "value".to_owned(), None).await?;
/// assert_eq!(store.get("key").await?, "value");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, MemoryEntry<V>>,
    options: Options,
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new unbounded store with empty default options.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new store bounded to `max_capacity` cost units.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring a store.
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder<V> {
        MemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryStoreBuilder<V>) -> Self {
        let mut moka_builder = Cache::builder()
            .weigher(|_key: &String, entry: &MemoryEntry<V>| u32::try_from(entry.cost.max(1)).unwrap_or(u32::MAX));

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        Self {
            inner: moka_builder.build(),
            options: builder.default_options.clone(),
        }
    }

    /// Returns the number of live entries.
    ///
    /// The count may lag behind recent writes until moka's pending
    /// maintenance runs; see [`run_pending_tasks`](Self::run_pending_tasks).
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs moka's pending maintenance so eviction and counts settle.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Reads an entry, expiring it in place when its deadline passed.
    async fn entry(&self, key: &str) -> Option<MemoryEntry<V>> {
        let entry = self.inner.get(key).await?;
        if entry.expired() {
            self.inner.invalidate(key).await;
            return None;
        }
        Some(entry)
    }
}

impl<V> MemoryStore<V>
where
    V: TagList + Clone + Send + Sync + 'static,
{
    /// Dedup-merges `key` into each tag entry and refreshes its TTL.
    async fn set_tags(&self, key: &str, tag_names: &[String]) {
        for tag in tag_names {
            let tag_key = tags::tag_key(tag);
            let mut keys = match self.entry(&tag_key).await {
                Some(entry) => entry.value.decode_tag_list().unwrap_or_default(),
                None => Vec::new(),
            };
            tags::merge_key(&mut keys, key);

            let entry = MemoryEntry {
                value: V::encode_tag_list(&keys),
                cost: 0,
                expires_at: Some(Instant::now() + tags::TAG_KEY_EXPIRY),
            };
            self.inner.insert(tag_key, entry).await;
        }
    }
}

#[async_trait]
impl<V> Store<V> for MemoryStore<V>
where
    V: TagList + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<V, Error> {
        self.entry(key)
            .await
            .map(|entry| entry.value)
            .ok_or(Error::NotFound { store: MEMORY_TYPE })
    }

    async fn get_with_ttl(&self, key: &str) -> Result<(V, Duration), Error> {
        self.entry(key)
            .await
            .map(|entry| {
                let ttl = entry.remaining_ttl();
                (entry.value, ttl)
            })
            .ok_or(Error::NotFound { store: MEMORY_TYPE })
    }

    async fn set(&self, key: &str, value: V, options: Option<Options>) -> Result<(), Error> {
        let options = options.unwrap_or_else(|| self.options.clone());

        let entry = MemoryEntry {
            value,
            cost: options.cost,
            expires_at: options.expiry().map(|ttl| Instant::now() + ttl),
        };
        self.inner.insert(key.to_owned(), entry).await;

        if !options.tags.is_empty() {
            self.set_tags(key, &options.tags).await;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        for tag in &options.tags {
            let tag_key = tags::tag_key(tag);
            let Some(keys) = self.entry(&tag_key).await.and_then(|entry| entry.value.decode_tag_list()) else {
                continue;
            };
            for key in keys {
                self.inner.invalidate(&key).await;
            }
            self.inner.invalidate(&tag_key).await;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.inner.invalidate_all();
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        MEMORY_TYPE
    }
}
