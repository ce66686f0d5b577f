// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Pass-through cache decorator reporting to a metric sink.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use cachet_store::{Error, InvalidateOptions, Options};

use crate::codec::Codec;
use crate::metrics::{CacheActivity, CacheOperation, Metrics};
use crate::{CacheInterface, CodecStats};

/// Type identifier returned by [`MetricCache::cache_type`].
pub const METRIC_TYPE: &str = "metric";

/// A decorator that reports every operation's outcome and timing.
///
/// Delegates verbatim to the wrapped cache, never altering values or errors.
/// Each operation updates the cumulative [`Codec`] counters and emits a
/// record plus a codec snapshot to the [`Metrics`] sink, attributed to the
/// wrapped cache's type.
pub struct MetricCache<K, V> {
    cache: Arc<dyn CacheInterface<K, V>>,
    metrics: Arc<dyn Metrics>,
    codec: Codec,
}

impl<K, V> std::fmt::Debug for MetricCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricCache")
            .field("cache_type", &self.cache.cache_type())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl<K, V> MetricCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync + 'static,
{
    /// Creates a metric-reporting decorator over `cache`.
    pub fn new(cache: Arc<dyn CacheInterface<K, V>>, metrics: Arc<dyn Metrics>) -> Self {
        Self {
            cache,
            metrics,
            codec: Codec::new(),
        }
    }

    /// Returns a snapshot of the counters accumulated so far.
    #[must_use]
    pub fn codec_stats(&self) -> CodecStats {
        self.codec.snapshot()
    }

    fn report(&self, operation: CacheOperation, activity: CacheActivity, started: Instant) {
        let cache_type = self.cache.cache_type();
        self.metrics.record(cache_type, operation, activity, started.elapsed());
        self.metrics.record_from_codec(cache_type, &self.codec.snapshot());
    }
}

#[async_trait]
impl<K, V> CacheInterface<K, V> for MetricCache<K, V>
where
    K: Send + Sync,
    V: Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        let started = Instant::now();
        let result = self.cache.get(key).await;

        let activity = match &result {
            Ok(_) => {
                self.codec.record_hit();
                CacheActivity::Hit
            }
            Err(error) if error.is_not_found() => {
                self.codec.record_miss();
                CacheActivity::Miss
            }
            Err(_) => {
                self.codec.record_miss();
                CacheActivity::Error
            }
        };
        self.report(CacheOperation::Get, activity, started);
        result
    }

    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error> {
        let started = Instant::now();
        let result = self.cache.set(key, value, options).await;

        self.codec.record_set(result.is_ok());
        let activity = if result.is_ok() { CacheActivity::Set } else { CacheActivity::Error };
        self.report(CacheOperation::Set, activity, started);
        result
    }

    async fn delete(&self, key: &K) -> Result<(), Error> {
        let started = Instant::now();
        let result = self.cache.delete(key).await;

        self.codec.record_delete(result.is_ok());
        let activity = if result.is_ok() { CacheActivity::Deleted } else { CacheActivity::Error };
        self.report(CacheOperation::Delete, activity, started);
        result
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        let started = Instant::now();
        let result = self.cache.invalidate(options).await;

        self.codec.record_invalidate(result.is_ok());
        let activity = if result.is_ok() {
            CacheActivity::Invalidated
        } else {
            CacheActivity::Error
        };
        self.report(CacheOperation::Invalidate, activity, started);
        result
    }

    async fn clear(&self) -> Result<(), Error> {
        let started = Instant::now();
        let result = self.cache.clear().await;

        self.codec.record_clear(result.is_ok());
        let activity = if result.is_ok() { CacheActivity::Cleared } else { CacheActivity::Error };
        self.report(CacheOperation::Clear, activity, started);
        result
    }

    fn cache_type(&self) -> &'static str {
        METRIC_TYPE
    }
}
