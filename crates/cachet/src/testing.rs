// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock cache implementation for testing.
//!
//! This module provides [`MockCache`], a configurable in-memory cache that
//! records all operations and supports failure injection for testing the
//! decorators layered over [`CacheInterface`](crate::CacheInterface).

use std::{collections::HashMap, hash::Hash, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;

use cachet_store::{Error, InvalidateOptions, Options};

use crate::CacheInterface;

/// Recorded cache operation with full context.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOp<K, V> {
    /// A get operation was performed with the given key.
    Get(K),
    /// A set operation was performed.
    Set {
        /// The key that was set.
        key: K,
        /// The value that was set.
        value: V,
        /// The per-call options, `None` meaning defaults.
        options: Option<Options>,
    },
    /// A delete operation was performed with the given key.
    Delete(K),
    /// An invalidate operation was performed with the given selector.
    Invalidate(InvalidateOptions),
    /// A clear operation was performed.
    Clear,
}

type FailPredicate<K, V> = Box<dyn Fn(&CacheOp<K, V>) -> bool + Send + Sync>;

/// A configurable mock cache for testing.
///
/// Stores values in memory, records every operation for later verification,
/// and can be configured to fail operations on demand via a predicate.
/// Clones share state, so a test can keep a handle while a decorator owns
/// the `Arc<dyn CacheInterface>` side.
///
/// # Examples
///
/// ```
/// use cachet::testing::{CacheOp, MockCache};
/// use cachet::CacheInterface;
///
/// # async fn example() {
/// let cache = MockCache::<&str, i32>::new();
///
/// cache.set(&"key", 42, None).await.unwrap();
/// assert_eq!(cache.get(&"key").await.unwrap(), 42);
///
/// assert_eq!(cache.operations(), vec![
///     CacheOp::Set { key: "key", value: 42, options: None },
///     CacheOp::Get("key"),
/// ]);
/// # }
/// ```
pub struct MockCache<K, V> {
    data: Arc<Mutex<HashMap<K, V>>>,
    operations: Arc<Mutex<Vec<CacheOp<K, V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<K, V>>>>,
    cache_type: &'static str,
}

impl<K, V> std::fmt::Debug for MockCache<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCache")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("cache_type", &self.cache_type)
            .finish()
    }
}

impl<K, V> Clone for MockCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
            cache_type: self.cache_type,
        }
    }
}

impl<K, V> Default for MockCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MockCache<K, V> {
    /// Creates a new empty mock cache reporting the type `"mock"`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            cache_type: "mock",
        }
    }

    /// Overrides the reported cache type.
    #[must_use]
    pub fn with_cache_type(mut self, cache_type: &'static str) -> Self {
        self.cache_type = cache_type;
        self
    }
}

impl<K, V> MockCache<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Sets a predicate that determines when operations should fail.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&CacheOp<K, V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<CacheOp<K, V>> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: CacheOp<K, V>) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self, op: &CacheOp<K, V>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

#[async_trait]
impl<K, V> CacheInterface<K, V> for MockCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        let op = CacheOp::Get(key.clone());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: get failed"));
        }
        self.data
            .lock()
            .get(key)
            .cloned()
            .ok_or(Error::NotFound { store: "mock" })
    }

    async fn set(&self, key: &K, value: V, options: Option<Options>) -> Result<(), Error> {
        let op = CacheOp::Set {
            key: key.clone(),
            value: value.clone(),
            options,
        };
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: set failed"));
        }
        self.data.lock().insert(key.clone(), value);
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<(), Error> {
        let op = CacheOp::Delete(key.clone());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: delete failed"));
        }
        self.data.lock().remove(key);
        Ok(())
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        let op = CacheOp::Invalidate(options);
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: invalidate failed"));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let op = CacheOp::Clear;
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: clear failed"));
        }
        self.data.lock().clear();
        Ok(())
    }

    fn cache_type(&self) -> &'static str {
        self.cache_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_operations_and_serves_data() {
        let cache = MockCache::<&str, i32>::new();

        cache.set(&"key", 42, None).await.unwrap();
        assert_eq!(cache.get(&"key").await.unwrap(), 42);
        assert!(cache.get(&"missing").await.unwrap_err().is_not_found());

        assert_eq!(
            cache.operations(),
            vec![
                CacheOp::Set {
                    key: "key",
                    value: 42,
                    options: None,
                },
                CacheOp::Get("key"),
                CacheOp::Get("missing"),
            ]
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let cache = MockCache::<&str, i32>::new();
        let handle = cache.clone();

        cache.set(&"key", 1, None).await.unwrap();
        assert_eq!(handle.get(&"key").await.unwrap(), 1);
        assert_eq!(handle.operations().len(), 2);
    }

    #[tokio::test]
    async fn failure_injection_applies_per_operation() {
        let cache = MockCache::<&str, i32>::new();
        cache.fail_when(|op| matches!(op, CacheOp::Clear));

        assert!(cache.clear().await.is_err());
        assert!(cache.set(&"key", 1, None).await.is_ok());

        cache.clear_failures();
        assert!(cache.clear().await.is_ok());
    }
}
