// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cluster-scoped adapter.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use cachet_store::{Error, InvalidateOptions, Options, Store, tags};

/// Type identifier returned by [`RedisClusterStore::store_type`].
pub const REDIS_CLUSTER_TYPE: &str = "rediscluster";

/// Contract the adapter requires from a clustered Redis-style client.
///
/// The surface matches [`RedisClient`](crate::RedisClient), cluster-scoped:
/// `flush_all` sweeps every node, and keys route by the cluster's own
/// slotting.
#[async_trait]
pub trait RedisClusterClient: Send + Sync {
    /// The client's transport error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Stores `value` under `key` with the given expiration.
    async fn set(&self, key: &str, value: Vec<u8>, expiration: Duration) -> Result<(), Self::Error>;

    /// Removes a single key.
    async fn del(&self, key: &str) -> Result<(), Self::Error>;

    /// Adds `member` to the set stored under `key`.
    async fn sadd(&self, key: &str, member: &str) -> Result<(), Self::Error>;

    /// Returns the members of the set stored under `key`.
    async fn smembers(&self, key: &str) -> Result<Vec<String>, Self::Error>;

    /// Refreshes the TTL of `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), Self::Error>;

    /// Observes the remaining TTL of `key`.
    async fn ttl(&self, key: &str) -> Result<Duration, Self::Error>;

    /// Removes every key across the cluster.
    async fn flush_all(&self) -> Result<(), Self::Error>;
}

/// A store adapter over a [`RedisClusterClient`].
#[derive(Debug)]
pub struct RedisClusterStore<C> {
    client: C,
    options: Options,
}

impl<C> RedisClusterStore<C>
where
    C: RedisClusterClient,
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

    async fn set_tags(&self, key: &str, tag_names: &[String]) {
        for tag in tag_names {
            let tag_key = tags::tag_key(tag);
            if let Err(error) = self.client.sadd(&tag_key, key).await {
                warn!(%error, %tag, "tag index write failed");
                continue;
            }
            if let Err(error) = self.client.expire(&tag_key, tags::TAG_KEY_EXPIRY).await {
                warn!(%error, %tag, "tag entry expiry refresh failed");
            }
        }
    }
}

#[async_trait]
impl<C> Store<Vec<u8>> for RedisClusterStore<C>
where
    C: RedisClusterClient,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>, Error> {
        self.client
            .get(key)
            .await
            .map_err(Error::client)?
            .ok_or(Error::NotFound {
                store: REDIS_CLUSTER_TYPE,
            })
    }

    async fn get_with_ttl(&self, key: &str) -> Result<(Vec<u8>, Duration), Error> {
        let value = self.get(key).await?;
        let ttl = self.client.ttl(key).await.map_err(Error::client)?;
        Ok((value, ttl))
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: Option<Options>) -> Result<(), Error> {
        let options = options.unwrap_or_else(|| self.options.clone());

        self.client
            .set(key, value, options.expiry().unwrap_or(Duration::ZERO))
            .await
            .map_err(Error::client)?;

        if !options.tags.is_empty() {
            self.set_tags(key, &options.tags).await;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.client.del(key).await.map_err(Error::client)
    }

    async fn invalidate(&self, options: InvalidateOptions) -> Result<(), Error> {
        for tag in &options.tags {
            let tag_key = tags::tag_key(tag);
            let Ok(keys) = self.client.smembers(&tag_key).await else {
                continue;
            };
            for key in keys {
                if let Err(error) = self.client.del(&key).await {
                    warn!(%error, %key, "tag invalidation delete failed");
                }
            }
            if let Err(error) = self.client.del(&tag_key).await {
                warn!(%error, %tag, "tag entry delete failed");
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.client.flush_all().await.map_err(Error::client)
    }

    fn store_type(&self) -> &'static str {
        REDIS_CLUSTER_TYPE
    }
}
