// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Store adapter over a memcache-protocol client.
//!
//! Memcached stores byte values and expresses expirations as whole seconds,
//! so this adapter fixes the value type to `Vec<u8>` and converts durations
//! at the seam. The concrete client is out of scope; implement
//! [`MemcacheClient`] over the driver in use.
//!
//! Memcached has no set type, so tag entries use the list-encoded strategy
//! from [`cachet_store::tags`], created through the client's atomic `add`
//! when absent.

mod store;

#[doc(inline)]
pub use store::{Item, MEMCACHE_TYPE, MemcacheClient, MemcacheStore};
