// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Store adapters over single-node and clustered Redis-style clients.
//!
//! Both adapters speak to a distributed key-value backend with a native set
//! type, so tag entries use sets directly (`sadd` + `expire`) instead of the
//! list encoding. Values are bytes; expirations are durations, with zero
//! meaning no expiry.
//!
//! The concrete clients are out of scope; implement [`RedisClient`] or
//! [`RedisClusterClient`] over the driver in use.

mod cluster;
mod single;
#[cfg(test)]
mod testing;

#[doc(inline)]
pub use cluster::{REDIS_CLUSTER_TYPE, RedisClusterClient, RedisClusterStore};
#[doc(inline)]
pub use single::{REDIS_TYPE, RedisClient, RedisStore};
