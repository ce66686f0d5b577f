// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A composable caching facade over heterogeneous key-value backends.
//!
//! This crate provides the typed cache layer sitting on top of the
//! [`cachet_store`] contract, plus decorators that add behavior without
//! changing the surface:
//!
//! - [`Cache`] — wraps a single store, hashing typed keys to their stable
//!   string fingerprint before delegation.
//! - [`LoadableCache`] — fills misses from a user-supplied load function and
//!   writes the loaded value back asynchronously.
//! - [`ChainCache`] — cascades reads across an ordered tier of caches and
//!   back-populates the closer tiers on a hit.
//! - [`MetricCache`] — reports per-operation outcome and timing to a
//!   [`Metrics`] sink.
//!
//! Every decorator implements [`CacheInterface`], so they compose freely:
//! a loadable cache over a chain of a memory tier and a Redis tier, wrapped
//! in metrics, is just three constructor calls.
//!
//! # Examples
//!
//! ```
//! use cachet::{Cache, CacheInterface};
//! use cachet_memory::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), cachet::Error> {
//! let store = MemoryStore::<String>::builder().max_capacity(10_000).build();
//! let cache = Cache::new(store);
//!
//! cache.set(&"user:42", "Jane".to_owned(), None).await?;
//! let value = cache.get(&"user:42").await?;
//! assert_eq!(value, "Jane");
//! # Ok(())
//! # }
//! ```

mod cache;
mod chain;
mod codec;
mod interface;
mod keys;
mod loadable;
mod metric;
mod metrics;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use cache::{CACHE_TYPE, Cache};
#[doc(inline)]
pub use chain::{CHAIN_TYPE, ChainCache};
#[doc(inline)]
pub use codec::{Codec, CodecStats};
#[doc(inline)]
pub use interface::CacheInterface;
#[doc(inline)]
pub use keys::CacheKey;
#[doc(inline)]
pub use loadable::{LOADABLE_TYPE, LoadFuture, LoadableCache};
#[doc(inline)]
pub use metric::{METRIC_TYPE, MetricCache};
#[doc(inline)]
pub use metrics::{CacheActivity, CacheOperation, Metrics, OtelMetrics};

pub use cachet_store::{BoxError, Error, InvalidateOptions, Options, Result};
