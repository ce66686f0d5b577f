// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Operation counters maintained by the metric decorator.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative operation counters for one cache.
///
/// Reads count as hits or misses; every error that is not a miss counts
/// against the operation's error counter. The [`MetricCache`](crate::MetricCache)
/// updates these from each operation's outcome and hands snapshots to the
/// metric sink.
#[derive(Debug, Default)]
pub struct Codec {
    hits: AtomicU64,
    misses: AtomicU64,
    set_success: AtomicU64,
    set_error: AtomicU64,
    delete_success: AtomicU64,
    delete_error: AtomicU64,
    invalidate_success: AtomicU64,
    invalidate_error: AtomicU64,
    clear_success: AtomicU64,
    clear_error: AtomicU64,
}

impl Codec {
    /// Creates a codec with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_set(&self, success: bool) {
        let counter = if success { &self.set_success } else { &self.set_error };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self, success: bool) {
        let counter = if success { &self.delete_success } else { &self.delete_error };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidate(&self, success: bool) {
        let counter = if success {
            &self.invalidate_success
        } else {
            &self.invalidate_error
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_clear(&self, success: bool) {
        let counter = if success { &self.clear_success } else { &self.clear_error };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> CodecStats {
        CodecStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            set_success: self.set_success.load(Ordering::Relaxed),
            set_error: self.set_error.load(Ordering::Relaxed),
            delete_success: self.delete_success.load(Ordering::Relaxed),
            delete_error: self.delete_error.load(Ordering::Relaxed),
            invalidate_success: self.invalidate_success.load(Ordering::Relaxed),
            invalidate_error: self.invalidate_error.load(Ordering::Relaxed),
            clear_success: self.clear_success.load(Ordering::Relaxed),
            clear_error: self.clear_error.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of a [`Codec`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CodecStats {
    pub hits: u64,
    pub misses: u64,
    pub set_success: u64,
    pub set_error: u64,
    pub delete_success: u64,
    pub delete_error: u64,
    pub invalidate_success: u64,
    pub invalidate_error: u64,
    pub clear_success: u64,
    pub clear_error: u64,
}

impl CodecStats {
    /// Iterates the counters as `(stat name, value)` pairs, in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> {
        [
            ("hit", self.hits),
            ("miss", self.misses),
            ("set_success", self.set_success),
            ("set_error", self.set_error),
            ("delete_success", self.delete_success),
            ("delete_error", self.delete_error),
            ("invalidate_success", self.invalidate_success),
            ("invalidate_error", self.invalidate_error),
            ("clear_success", self.clear_success),
            ("clear_error", self.clear_error),
        ]
        .into_iter()
    }
}
