// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides [`MockStore`], a configurable in-memory store that
//! records all operations and supports failure injection for testing error
//! paths in the layers above the [`Store`](crate::Store) contract.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Error, InvalidateOptions, Options, Store};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp<V> {
    /// A get operation was performed with the given key.
    Get(String),
    /// A get-with-TTL operation was performed with the given key.
    GetWithTtl(String),
    /// A set operation was performed.
    Set {
        /// The key that was set.
        key: String,
        /// The value that was set.
        value: V,
        /// The per-call options, `None` meaning store defaults.
        options: Option<Options>,
    },
    /// A delete operation was performed with the given key.
    Delete(String),
    /// An invalidate operation was performed with the given selector.
    Invalidate(InvalidateOptions),
    /// A clear operation was performed.
    Clear,
}

type FailPredicate<V> = Box<dyn Fn(&StoreOp<V>) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// The store keeps values in memory and can be configured to fail operations
/// on demand. All operations are recorded for later verification, which lets
/// tests assert on the exact sequence a decorator issued.
///
/// # Examples
///
/// ```
/// use cachet_store::testing::{MockStore, StoreOp};
/// use cachet_store::Store;
///
/// # async fn example() {
/// let store = MockStore::<String>::new();
///
/// store.set("key", "value".to_owned(), None).await.unwrap();
/// let value = store.get("key").await.unwrap();
/// assert_eq!(value, "value");
///
/// assert_eq!(store.operations(), vec![
///     StoreOp::Set { key: "key".to_owned(), value: "value".to_owned(), options: None },
///     StoreOp::Get("key".to_owned()),
/// ]);
/// # }
/// ```
///
/// # Failure Injection
///
/// ```
/// use cachet_store::testing::{MockStore, StoreOp};
/// use cachet_store::Store;
///
/// # async fn example() {
/// let store: MockStore<String> = MockStore::new();
///
/// // Fail all get operations.
/// store.fail_when(|op| matches!(op, StoreOp::Get(_)));
/// assert!(store.get("key").await.is_err());
/// # }
/// ```
pub struct MockStore<V> {
    data: Arc<Mutex<HashMap<String, (V, Option<Options>)>>>,
    operations: Arc<Mutex<Vec<StoreOp<V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<V>>>>,
    store_type: &'static str,
}

impl<V> std::fmt::Debug for MockStore<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("store_type", &self.store_type)
            .finish()
    }
}

impl<V> Clone for MockStore<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
            store_type: self.store_type,
        }
    }
}

impl<V> Default for MockStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MockStore<V> {
    /// Creates a new empty mock store reporting the type `"mock"`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            store_type: "mock",
        }
    }

    /// Overrides the reported store type.
    #[must_use]
    pub fn with_store_type(mut self, store_type: &'static str) -> Self {
        self.store_type = store_type;
        self
    }

    /// Returns the number of entries currently held.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store holds the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }
}

impl<V> MockStore<V>
where
    V: Clone,
{
    /// Sets a predicate that determines when operations should fail.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp<V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<V>> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp<V>) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self, op: &StoreOp<V>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

#[async_trait]
impl<V> Store<V> for MockStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<V, Error> {
        let op = StoreOp::Get(key.to_owned());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: get failed"));
        }
        self.data
            .lock()
            .get(key)
            .map(|(value, _)| value.clone())
            .ok_or(Error::NotFound { store: self.store_type })
    }

    async fn get_with_ttl(&self, key: &str) -> Result<(V, Duration), Error> {
        let op = StoreOp::GetWithTtl(key.to_owned());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: get_with_ttl failed"));
        }
        self.data
            .lock()
            .get(key)
            .map(|(value, options)| {
                let ttl = options
                    .as_ref()
                    .and_then(Options::expiry)
                    .unwrap_or(Duration::ZERO);
                (value.clone(), ttl)
            })
            .ok_or(Error::NotFound { store: self.store_type })
    }

    async fn set(&self, key: &str, value: V, options: Option<Options>) -> Result<(), Error> {
        let op = StoreOp::Set {
            key: key.to_owned(),
            value: value.clone(),
            options: options.clone(),
        };
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: set failed"));
        }
        self.data.lock().insert(key.to_owned(), (value, options));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let op = StoreOp::Delete(key.to_owned());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: delete failed"));
        }
        self.data.lock().remove(key);
        Ok(())
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        let op = StoreOp::Invalidate(options.clone());
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: invalidate failed"));
        }
        // Tag semantics are exercised against the real adapters; the mock
        // removes keys whose recorded set options carried one of the tags.
        let mut data = self.data.lock();
        data.retain(|_, (_, set_options)| {
            set_options
                .as_ref()
                .is_none_or(|set_options| !set_options.tags.iter().any(|tag| options.tags.contains(tag)))
        });
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let op = StoreOp::Clear;
        let should_fail = self.should_fail(&op);
        self.record(op);
        if should_fail {
            return Err(Error::client("mock: clear failed"));
        }
        self.data.lock().clear();
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        self.store_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_operations_in_order() {
        let store = MockStore::<String>::new();

        store.set("key", "value".to_owned(), None).await.unwrap();
        let value = store.get("key").await.unwrap();
        assert_eq!(value, "value");
        store.delete("key").await.unwrap();

        assert_eq!(
            store.operations(),
            vec![
                StoreOp::Set {
                    key: "key".to_owned(),
                    value: "value".to_owned(),
                    options: None,
                },
                StoreOp::Get("key".to_owned()),
                StoreOp::Delete("key".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn miss_is_an_error() {
        let store = MockStore::<String>::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn failure_injection_targets_specific_operations() {
        let store = MockStore::<String>::new();
        store.set("key", "value".to_owned(), None).await.unwrap();

        store.fail_when(|op| matches!(op, StoreOp::Get(k) if k == "forbidden"));
        assert!(store.get("forbidden").await.is_err());
        assert!(store.get("key").await.is_ok());

        store.clear_failures();
        assert!(store.get("forbidden").await.is_err_and(|e| e.is_not_found()));
    }

    #[tokio::test]
    async fn invalidate_sweeps_tagged_entries() {
        let store = MockStore::<String>::new();
        store
            .set("k1", "v1".to_owned(), Some(Options::new().with_tags(["tag1"])))
            .await
            .unwrap();
        store.set("k2", "v2".to_owned(), None).await.unwrap();

        store.invalidate(InvalidateOptions::tags(["tag1"])).await.unwrap();

        assert!(!store.contains_key("k1"));
        assert!(store.contains_key("k2"));
    }

    #[tokio::test]
    async fn get_with_ttl_reports_recorded_expiration() {
        let store = MockStore::<String>::new();
        store
            .set(
                "key",
                "value".to_owned(),
                Some(Options::new().with_expiration(Duration::from_secs(5))),
            )
            .await
            .unwrap();

        let (value, ttl) = store.get_with_ttl("key").await.unwrap();
        assert_eq!(value, "value");
        assert_eq!(ttl, Duration::from_secs(5));
    }
}
