// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cost-based store adapter.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use cachet_store::{Error, InvalidateOptions, Options, Store, TagList, tags};

/// Type identifier returned by [`RistrettoStore::store_type`].
pub const RISTRETTO_TYPE: &str = "ristretto";

/// Contract the adapter requires from a cost-based in-process client.
///
/// Operations are synchronous: the client is expected to live in-process and
/// answer from memory. A `set_with_ttl` returning `false` means the client
/// rejected the write (for example, the cost did not fit the admission
/// budget).
pub trait RistrettoClient<V>: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` with the given cost and TTL.
    ///
    /// A zero TTL means no expiry. Returns `false` when the write was
    /// rejected.
    fn set_with_ttl(&self, key: &str, value: V, cost: i64, ttl: Duration) -> bool;

    /// Removes a single key.
    fn del(&self, key: &str);

    /// Removes every entry.
    fn clear(&self);
}

/// A store adapter over a [`RistrettoClient`].
///
/// Tag entries are list-encoded: each tagged `set` reads the current entry,
/// dedup-merges the key's fingerprint into it, and rewrites the full list
/// with a refreshed TTL.
#[derive(Debug)]
pub struct RistrettoStore<C, V> {
    client: C,
    options: Options,
    _marker: PhantomData<fn() -> V>,
}

impl<C, V> RistrettoStore<C, V>
where
    C: RistrettoClient<V>,
{
    /// Creates an adapter over `client`.
    ///
    /// `options` become the store defaults; `None` means empty defaults
    /// (no expiry, zero cost, no tags).
    pub fn new(client: C, options: Option<Options>) -> Self {
        Self {
            client,
            options: options.unwrap_or_default(),
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C, V> RistrettoStore<C, V>
where
    C: RistrettoClient<V>,
    V: TagList + Clone + Debug + Send + Sync + 'static,
{
    /// Dedup-merges `key` into each tag entry and rewrites it.
    ///
    /// Failures are swallowed once the primary put succeeded; the index is
    /// best-effort.
    fn set_tags(&self, key: &str, tag_names: &[String]) {
        for tag in tag_names {
            let tag_key = tags::tag_key(tag);
            let mut keys = self
                .client
                .get(&tag_key)
                .and_then(|value| value.decode_tag_list())
                .unwrap_or_default();
            tags::merge_key(&mut keys, key);

            if !self
                .client
                .set_with_ttl(&tag_key, V::encode_tag_list(&keys), 0, tags::TAG_KEY_EXPIRY)
            {
                warn!(%tag, "tag index write rejected");
            }
        }
    }
}

#[async_trait]
impl<C, V> Store<V> for RistrettoStore<C, V>
where
    C: RistrettoClient<V>,
    V: TagList + Clone + Debug + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<V, Error> {
        self.client.get(key).ok_or(Error::NotFound { store: RISTRETTO_TYPE })
    }

    async fn get_with_ttl(&self, key: &str) -> Result<(V, Duration), Error> {
        // The client does not expose per-entry deadlines.
        Ok((self.get(key).await?, Duration::ZERO))
    }

    async fn set(&self, key: &str, value: V, options: Option<Options>) -> Result<(), Error> {
        let options = options.unwrap_or_else(|| self.options.clone());

        let accepted = self.client.set_with_ttl(
            key,
            value.clone(),
            options.cost,
            options.expiry().unwrap_or(Duration::ZERO),
        );
        if !accepted {
            return Err(Error::set_rejected(key, format!("{value:?}")));
        }

        if !options.tags.is_empty() {
            self.set_tags(key, &options.tags);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.client.del(key);
        Ok(())
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        for tag in &options.tags {
            let tag_key = tags::tag_key(tag);
            let Some(keys) = self.client.get(&tag_key).and_then(|value| value.decode_tag_list()) else {
                continue;
            };
            for key in &keys {
                self.client.del(key);
            }
            self.client.del(&tag_key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.client.clear();
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        RISTRETTO_TYPE
    }
}
