// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Store adapter over a cost-based in-process cache client.
//!
//! This crate maps the store contract onto a ristretto-style client: a
//! concurrent in-process cache that admits and evicts entries by an integer
//! cost. The concrete client is out of scope; implement [`RistrettoClient`]
//! over whichever engine hosts the data.
//!
//! The client has no set type, so tag entries use the list-encoded strategy
//! from [`cachet_store::tags`].

mod store;

#[doc(inline)]
pub use store::{RISTRETTO_TYPE, RistrettoClient, RistrettoStore};
