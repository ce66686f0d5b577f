// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Core storage abstractions for building cache backends.
//!
//! This crate defines the [`Store`] trait that every cache backend adapter
//! must satisfy, along with [`Options`] for per-call policies, [`Error`] for
//! fallible operations, and the [`tags`] module implementing the cross-cutting
//! tag-index protocol.
//!
//! # Overview
//!
//! A store adapter maps the uniform contract onto one concrete backend:
//! an in-process cache, a memcached server, a Redis node or cluster. Adapters
//! work on pre-hashed string keys; typed keys and the decorator stack live in
//! the `cachet` crate, which never needs to know which backend it is driving.
//!
//! Backends differ in what they can natively express, so the tag index comes
//! in two strategies (see [`tags`]): native sets where the backend has them,
//! and comma-separated list entries everywhere else. Both hide behind the same
//! [`Store`] surface.
//!
//! # Implementing a Store
//!
//! ```
//! use async_trait::async_trait;
//! use cachet_store::{Error, InvalidateOptions, Options, Store};
//! use parking_lot::RwLock;
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! struct SimpleStore(RwLock<HashMap<String, String>>);
//!
//! #[async_trait]
//! impl Store<String> for SimpleStore {
//!     async fn get(&self, key: &str) -> Result<String, Error> {
//!         self.0.read().get(key).cloned().ok_or(Error::not_found("simple"))
//!     }
//!
//!     async fn get_with_ttl(&self, key: &str) -> Result<(String, Duration), Error> {
//!         Ok((self.get(key).await?, Duration::ZERO))
//!     }
//!
//!     async fn set(&self, key: &str, value: String, _options: Option<Options>) -> Result<(), Error> {
//!         self.0.write().insert(key.to_owned(), value);
//!         Ok(())
//!     }
//!
//!     async fn delete(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().remove(key);
//!         Ok(())
//!     }
//!
//!     async fn invalidate(&self, _options: InvalidateOptions) -> Result<(), Error> {
//!         Ok(())
//!     }
//!
//!     async fn clear(&self) -> Result<(), Error> {
//!         self.0.write().clear();
//!         Ok(())
//!     }
//!
//!     fn store_type(&self) -> &'static str {
//!         "simple"
//!     }
//! }
//! ```

pub mod error;
mod options;
mod store;
pub mod tags;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use error::{BoxError, Error, Result};
#[doc(inline)]
pub use options::{InvalidateOptions, Options};
#[doc(inline)]
pub use store::Store;
#[doc(inline)]
pub use tags::TagList;
