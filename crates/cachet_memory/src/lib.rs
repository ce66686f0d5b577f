// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process store implementation using moka.
//!
//! This crate provides [`MemoryStore`], an in-process store backed by the
//! moka crate, which offers high-performance concurrent caching with
//! eviction policies. It implements the full store contract, including the
//! list-encoded tag index, so an in-process tier is interchangeable with any
//! remote backend in a composition.

mod builder;
mod store;

#[doc(inline)]
pub use builder::MemoryStoreBuilder;
#[doc(inline)]
pub use store::{MEMORY_TYPE, MemoryStore};
