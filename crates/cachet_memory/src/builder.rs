// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-process stores.
//!
//! This module provides a builder API for `MemoryStore` that abstracts the
//! underlying moka configuration, providing a stable API surface without
//! exposing moka's types.

use std::marker::PhantomData;

use cachet_store::Options;

use crate::store::MemoryStore;

/// Builder for configuring a [`MemoryStore`].
///
/// # Examples
///
/// ```
/// use cachet_memory::MemoryStore;
/// use cachet_store::Options;
/// use std::time::Duration;
///
/// let store = MemoryStore::<String>::builder()
///     .max_capacity(10_000)
///     .initial_capacity(100)
///     .default_options(Options::new().with_expiration(Duration::from_secs(300)))
///     .build();
/// ```
#[derive(Debug)]
pub struct MemoryStoreBuilder<V> {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) default_options: Options,
    _phantom: PhantomData<V>,
}

impl<V> Default for MemoryStoreBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryStoreBuilder<V> {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded store with `TinyLFU`
    /// eviction and empty default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_capacity: None,
            initial_capacity: None,
            default_options: Options::default(),
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum capacity of the store, in cost units.
    ///
    /// Entries are weighed by their `Options::cost` (minimum weight 1, so an
    /// uncosted workload is bounded by entry count). Once the capacity is
    /// reached, entries are evicted using the `TinyLFU` policy.
    ///
    /// If not set, the store is unbounded.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the store.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets the [`Options`] applied when a `set` carries none.
    #[must_use]
    pub fn default_options(mut self, options: Options) -> Self {
        self.default_options = options;
        self
    }

    /// Builds the configured [`MemoryStore`].
    #[must_use]
    pub fn build(self) -> MemoryStore<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        MemoryStore::from_builder(&self)
    }
}
