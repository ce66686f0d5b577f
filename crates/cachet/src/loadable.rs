// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Load-through cache decorator with an asynchronous write-back channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use cachet_store::{BoxError, Error, InvalidateOptions, Options};

use crate::{CacheInterface, CacheKey};

/// Type identifier returned by [`LoadableCache::cache_type`].
pub const LOADABLE_TYPE: &str = "loadable";

/// Capacity of the write-back channel between `get` and the fill worker.
const SET_CHANNEL_CAPACITY: usize = 10_000;

/// Future returned by a load function.
pub type LoadFuture<V> = Pin<Box<dyn Future<Output = Result<V, BoxError>> + Send>>;

type LoadFn<K, V> = dyn Fn(K) -> LoadFuture<V> + Send + Sync;

/// A queued asynchronous write produced by a miss that loaded successfully.
struct SetRequest<K, V> {
    key: K,
    value: V,
    options: Option<Options>,
}

/// A cache decorator that fills misses from a user-supplied source.
///
/// On a miss, the load function is invoked and its value returned to the
/// caller immediately; the write into the wrapped cache happens
/// asynchronously through a bounded channel drained by a single background
/// worker. There is therefore no read-your-writes guarantee right after a
/// miss-fill, and loader failures are returned to the caller without caching
/// anything.
///
/// Concurrent misses for the same key are not coalesced: each invokes the
/// loader and each enqueues its own fill. Dropping a `get` future cancels an
/// in-flight load; fills already enqueued still run to completion on the
/// worker.
///
/// Dropping the decorator closes the channel; the worker finishes the fills
/// already enqueued and exits. The constructor must run inside a Tokio
/// runtime, which hosts the worker.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cachet::{Cache, CacheInterface, LoadableCache};
/// use cachet_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachet::Error> {
/// let cache = Arc::new(Cache::new(MemoryStore::<String>::new()));
/// let loadable = LoadableCache::new(
///     |key: &'static str| async move { Ok(format!("loaded:{key}")) },
///     cache,
/// );
///
/// // Miss: the loader runs and its value is returned immediately.
/// assert_eq!(loadable.get(&"my-key").await?, "loaded:my-key");
/// # Ok(())
/// # }
/// ```
pub struct LoadableCache<K, V> {
    cache: Arc<dyn CacheInterface<K, V>>,
    load_fn: Box<LoadFn<K, V>>,
    set_tx: mpsc::Sender<SetRequest<K, V>>,
}

impl<K, V> std::fmt::Debug for LoadableCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadableCache")
            .field("cache_type", &self.cache.cache_type())
            .finish_non_exhaustive()
    }
}

impl<K, V> LoadableCache<K, V>
where
    K: CacheKey + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a loadable cache over `cache`, filling misses with `load_fn`.
    ///
    /// Spawns the write-back worker on the ambient Tokio runtime.
    pub fn new<F, Fut>(load_fn: F, cache: Arc<dyn CacheInterface<K, V>>) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, BoxError>> + Send + 'static,
    {
        let (set_tx, set_rx) = mpsc::channel(SET_CHANNEL_CAPACITY);
        tokio::spawn(Self::run_writer(Arc::clone(&cache), set_rx));

        Self {
            cache,
            load_fn: Box::new(move |key| -> LoadFuture<V> { Box::pin(load_fn(key)) }),
            set_tx,
        }
    }

    /// Returns a reference to the wrapped cache.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn CacheInterface<K, V>> {
        &self.cache
    }

    /// Drains the write-back channel, performing one wrapped `set` per
    /// request. Exits once every sender is gone.
    async fn run_writer(cache: Arc<dyn CacheInterface<K, V>>, mut set_rx: mpsc::Receiver<SetRequest<K, V>>) {
        while let Some(request) = set_rx.recv().await {
            let SetRequest { key, value, options } = request;
            if let Err(error) = cache.set(&key, value, options).await {
                warn!(%error, "asynchronous cache fill failed");
            }
        }
    }

    fn enqueue_set(&self, key: K, value: V) {
        let request = SetRequest {
            key,
            value,
            options: None,
        };
        // The read path never waits on the write-back queue.
        if self.set_tx.try_send(request).is_err() {
            warn!("write-back channel full or closed, dropping cache fill");
        }
    }
}

#[async_trait]
impl<K, V> CacheInterface<K, V> for LoadableCache<K, V>
where
    K: CacheKey + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        if let Ok(value) = self.cache.get(key).await {
            return Ok(value);
        }

        let value = (self.load_fn)(key.clone()).await.map_err(Error::load)?;
        self.enqueue_set(key.clone(), value.clone());
        Ok(value)
    }

    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error> {
        self.cache.set(key, value, options).await
    }

    async fn delete(&self, key: &K) -> Result<(), Error> {
        self.cache.delete(key).await
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        self.cache.invalidate(options).await
    }

    async fn clear(&self) -> Result<(), Error> {
        self.cache.clear().await
    }

    fn cache_type(&self) -> &'static str {
        LOADABLE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CacheOp, MockCache};
    use std::time::Duration;

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition was not met within the polling window");
    }

    fn loadable_over(
        cache: &MockCache<&'static str, String>,
        load_fn: impl Fn(&'static str) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> LoadableCache<&'static str, String> {
        let load_fn = Arc::new(load_fn);
        LoadableCache::new(
            move |key| {
                let load_fn = Arc::clone(&load_fn);
                async move { load_fn(key) }
            },
            Arc::new(cache.clone()),
        )
    }

    #[tokio::test]
    async fn get_when_already_in_cache_never_invokes_the_loader() {
        let cache = MockCache::new();
        cache.set(&"my-key", "world".to_owned(), None).await.unwrap();
        cache.clear_operations();

        let loadable = loadable_over(&cache, |_| panic!("loader should not be called"));

        let value = loadable.get(&"my-key").await.unwrap();
        assert_eq!(value, "world");
        assert_eq!(cache.operations(), vec![CacheOp::Get("my-key")]);
    }

    #[tokio::test]
    async fn miss_with_failing_loader_returns_the_loader_error_and_sets_nothing() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| {
            Err("An error has occurred while loading data from custom source".into())
        });

        let err = loadable.get(&"my-key").await.unwrap_err();
        assert!(matches!(err, Error::Load(_)));
        assert_eq!(
            err.to_string(),
            "An error has occurred while loading data from custom source"
        );

        // Give any stray fill a chance to run, then confirm none happened.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.operations(), vec![CacheOp::Get("my-key")]);
    }

    #[tokio::test]
    async fn miss_with_successful_loader_returns_immediately_and_fills_eventually() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("world".to_owned()));

        let value = loadable.get(&"my-key").await.unwrap();
        assert_eq!(value, "world");

        let fill = CacheOp::Set {
            key: "my-key",
            value: "world".to_owned(),
            options: None,
        };
        eventually(|| cache.operations().contains(&fill)).await;
    }

    #[tokio::test]
    async fn delete_passes_through() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("a value".to_owned()));

        loadable.delete(&"my-key").await.unwrap();
        assert_eq!(cache.operations(), vec![CacheOp::Delete("my-key")]);
    }

    #[tokio::test]
    async fn delete_propagates_errors() {
        let cache = MockCache::new();
        cache.fail_when(|op| matches!(op, CacheOp::Delete(_)));
        let loadable = loadable_over(&cache, |_| Ok("a value".to_owned()));

        let err = loadable.delete(&"my-key").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn invalidate_passes_through() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("a value".to_owned()));

        let options = InvalidateOptions::tags(["tag1"]);
        loadable.invalidate(options.clone()).await.unwrap();
        assert_eq!(cache.operations(), vec![CacheOp::Invalidate(options)]);
    }

    #[tokio::test]
    async fn clear_passes_through_and_propagates_errors() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("a value".to_owned()));

        loadable.clear().await.unwrap();
        assert_eq!(cache.operations(), vec![CacheOp::Clear]);

        cache.fail_when(|op| matches!(op, CacheOp::Clear));
        assert!(loadable.clear().await.is_err());
    }

    #[tokio::test]
    async fn dropping_the_decorator_lets_enqueued_fills_finish() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("world".to_owned()));

        loadable.get(&"my-key").await.unwrap();
        drop(loadable);

        let fill = CacheOp::Set {
            key: "my-key",
            value: "world".to_owned(),
            options: None,
        };
        eventually(|| cache.operations().contains(&fill)).await;
    }

    #[tokio::test]
    async fn cache_type_is_the_documented_constant() {
        let cache = MockCache::new();
        let loadable = loadable_over(&cache, |_| Ok("a value".to_owned()));
        assert_eq!(loadable.cache_type(), "loadable");
    }
}
