// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The memcache store adapter.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use cachet_store::{Error, InvalidateOptions, Options, Store, TagList, tags};

/// Type identifier returned by [`MemcacheStore::store_type`].
pub const MEMCACHE_TYPE: &str = "memcache";

/// An item as the memcache protocol sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The item's key.
    pub key: String,
    /// The item's payload.
    pub value: Vec<u8>,
    /// Expiration in whole seconds; zero means no expiry.
    pub expiration: i32,
}

/// Contract the adapter requires from a memcache client.
///
/// A `get` resolving to `Ok(None)` is a miss; transport failures surface
/// through the client's error type and are propagated verbatim. `add` must
/// be the protocol's atomic store-if-absent.
#[async_trait]
pub trait MemcacheClient: Send + Sync {
    /// The client's transport error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches an item.
    async fn get(&self, key: &str) -> Result<Option<Item>, Self::Error>;

    /// Stores an item unconditionally.
    async fn set(&self, item: Item) -> Result<(), Self::Error>;

    /// Stores an item only if the key is absent.
    async fn add(&self, item: Item) -> Result<(), Self::Error>;

    /// Removes a single key.
    async fn delete(&self, key: &str) -> Result<(), Self::Error>;

    /// Removes every item on the server.
    async fn flush_all(&self) -> Result<(), Self::Error>;
}

/// A store adapter over a [`MemcacheClient`].
///
/// Tag entries are list-encoded. A first tagged write creates the entry with
/// the protocol's atomic `add`; a later write merges new fingerprints via
/// `set`; a fingerprint already on the list leaves the entry untouched (no
/// write, no TTL refresh).
#[derive(Debug)]
pub struct MemcacheStore<C> {
    client: C,
    options: Options,
}

impl<C> MemcacheStore<C>
where
    C: MemcacheClient,
{
    /// Creates an adapter over `client`.
    ///
    /// `options` become the store defaults; `None` means empty defaults.
    pub fn new(client: C, options: Option<Options>) -> Self {
        Self {
            client,
            options: options.unwrap_or_default(),
        }
    }

    /// Returns a reference to the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Updates the tag index after a successful primary put.
    ///
    /// Failures are swallowed; the index is best-effort.
    async fn set_tags(&self, key: &str, tag_names: &[String]) {
        for tag in tag_names {
            let tag_key = tags::tag_key(tag);
            match self.client.get(&tag_key).await {
                Ok(None) => {
                    let item = Item {
                        key: tag_key,
                        value: key.as_bytes().to_vec(),
                        expiration: expiration_seconds(Some(tags::TAG_KEY_EXPIRY)),
                    };
                    if let Err(error) = self.client.add(item).await {
                        warn!(%error, %tag, "tag index write failed");
                    }
                }
                Ok(Some(item)) => {
                    let mut keys = item.value.decode_tag_list().unwrap_or_default();
                    if tags::merge_key(&mut keys, key) {
                        let item = Item {
                            key: tag_key,
                            value: Vec::<u8>::encode_tag_list(&keys),
                            expiration: expiration_seconds(Some(tags::TAG_KEY_EXPIRY)),
                        };
                        if let Err(error) = self.client.set(item).await {
                            warn!(%error, %tag, "tag index write failed");
                        }
                    }
                }
                Err(error) => warn!(%error, %tag, "tag index read failed"),
            }
        }
    }
}

/// Converts an expiration to the protocol's whole seconds, saturating.
fn expiration_seconds(expiry: Option<Duration>) -> i32 {
    expiry
        .map(|d| i32::try_from(d.as_secs()).unwrap_or(i32::MAX))
        .unwrap_or(0)
}

#[async_trait]
impl<C> Store<Vec<u8>> for MemcacheStore<C>
where
    C: MemcacheClient,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>, Error> {
        self.client
            .get(key)
            .await
            .map_err(Error::client)?
            .map(|item| item.value)
            .ok_or(Error::NotFound { store: MEMCACHE_TYPE })
    }

    async fn get_with_ttl(&self, key: &str) -> Result<(Vec<u8>, Duration), Error> {
        self.client
            .get(key)
            .await
            .map_err(Error::client)?
            .map(|item| {
                let ttl = Duration::from_secs(u64::try_from(item.expiration).unwrap_or(0));
                (item.value, ttl)
            })
            .ok_or(Error::NotFound { store: MEMCACHE_TYPE })
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: Option<Options>) -> Result<(), Error> {
        let options = options.unwrap_or_else(|| self.options.clone());

        let item = Item {
            key: key.to_owned(),
            value,
            expiration: expiration_seconds(options.expiry()),
        };
        self.client.set(item).await.map_err(Error::client)?;

        if !options.tags.is_empty() {
            self.set_tags(key, &options.tags).await;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.client.delete(key).await.map_err(Error::client)
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        for tag in &options.tags {
            let tag_key = tags::tag_key(tag);
            let Ok(Some(item)) = self.client.get(&tag_key).await else {
                continue;
            };
            let Some(keys) = item.value.decode_tag_list() else {
                continue;
            };
            for key in keys {
                if let Err(error) = self.client.delete(&key).await {
                    warn!(%error, %key, "tag invalidation delete failed");
                }
            }
            if let Err(error) = self.client.delete(&tag_key).await {
                warn!(%error, %tag, "tag entry delete failed");
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.client.flush_all().await.map_err(Error::client)
    }

    fn store_type(&self) -> &'static str {
        MEMCACHE_TYPE
    }
}
