// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared scripted client for the adapter tests.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{RedisClient, RedisClusterClient};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Get(String),
    Set {
        key: String,
        value: Vec<u8>,
        expiration: Duration,
    },
    Del(String),
    SAdd {
        key: String,
        member: String,
    },
    SMembers(String),
    Expire {
        key: String,
        ttl: Duration,
    },
    Ttl(String),
    FlushAll,
}

type FailPredicate = Box<dyn Fn(&Call) -> bool + Send + Sync>;

/// Records every call and serves scripted values, sets, and TTLs.
#[derive(Default)]
pub(crate) struct MockClient {
    values: Mutex<HashMap<String, Vec<u8>>>,
    sets: Mutex<HashMap<String, Vec<String>>>,
    ttls: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<Call>>,
    fail_when: Mutex<Option<FailPredicate>>,
}

impl MockClient {
    pub(crate) fn with_value(self, key: &str, value: &[u8]) -> Self {
        self.values.lock().insert(key.to_owned(), value.to_vec());
        self
    }

    pub(crate) fn with_set_members(self, key: &str, members: &[&str]) -> Self {
        self.sets
            .lock()
            .insert(key.to_owned(), members.iter().map(|&m| m.to_owned()).collect());
        self
    }

    pub(crate) fn with_ttl(self, key: &str, ttl: Duration) -> Self {
        self.ttls.lock().insert(key.to_owned(), ttl);
        self
    }

    pub(crate) fn fail_when(&self, predicate: impl Fn(&Call) -> bool + Send + Sync + 'static) {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn check(&self, call: Call) -> Result<(), io::Error> {
        let should_fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&call));
        self.calls.lock().push(call);
        if should_fail {
            Err(io::Error::other("An unexpected error occurred"))
        } else {
            Ok(())
        }
    }

    async fn do_get(&self, key: &str) -> Result<Option<Vec<u8>>, io::Error> {
        self.check(Call::Get(key.to_owned()))?;
        Ok(self.values.lock().get(key).cloned())
    }

    async fn do_set(&self, key: &str, value: Vec<u8>, expiration: Duration) -> Result<(), io::Error> {
        self.check(Call::Set {
            key: key.to_owned(),
            value: value.clone(),
            expiration,
        })?;
        self.values.lock().insert(key.to_owned(), value);
        Ok(())
    }

    async fn do_del(&self, key: &str) -> Result<(), io::Error> {
        self.check(Call::Del(key.to_owned()))?;
        self.values.lock().remove(key);
        self.sets.lock().remove(key);
        Ok(())
    }

    async fn do_sadd(&self, key: &str, member: &str) -> Result<(), io::Error> {
        self.check(Call::SAdd {
            key: key.to_owned(),
            member: member.to_owned(),
        })?;
        let mut sets = self.sets.lock();
        let members = sets.entry(key.to_owned()).or_default();
        if !members.iter().any(|m| m == member) {
            members.push(member.to_owned());
        }
        Ok(())
    }

    async fn do_smembers(&self, key: &str) -> Result<Vec<String>, io::Error> {
        self.check(Call::SMembers(key.to_owned()))?;
        Ok(self.sets.lock().get(key).cloned().unwrap_or_default())
    }

    async fn do_expire(&self, key: &str, ttl: Duration) -> Result<(), io::Error> {
        self.check(Call::Expire {
            key: key.to_owned(),
            ttl,
        })?;
        self.ttls.lock().insert(key.to_owned(), ttl);
        Ok(())
    }

    async fn do_ttl(&self, key: &str) -> Result<Duration, io::Error> {
        self.check(Call::Ttl(key.to_owned()))?;
        Ok(self.ttls.lock().get(key).copied().unwrap_or(Duration::ZERO))
    }

    async fn do_flush_all(&self) -> Result<(), io::Error> {
        self.check(Call::FlushAll)?;
        self.values.lock().clear();
        self.sets.lock().clear();
        Ok(())
    }
}

#[async_trait]
impl RedisClient for MockClient {
    type Error = io::Error;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, io::Error> {
        self.do_get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiration: Duration) -> Result<(), io::Error> {
        self.do_set(key, value, expiration).await
    }

    async fn del(&self, key: &str) -> Result<(), io::Error> {
        self.do_del(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), io::Error> {
        self.do_sadd(key, member).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, io::Error> {
        self.do_smembers(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), io::Error> {
        self.do_expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<Duration, io::Error> {
        self.do_ttl(key).await
    }

    async fn flush_all(&self) -> Result<(), io::Error> {
        self.do_flush_all().await
    }
}

#[async_trait]
impl RedisClusterClient for MockClient {
    type Error = io::Error;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, io::Error> {
        self.do_get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiration: Duration) -> Result<(), io::Error> {
        self.do_set(key, value, expiration).await
    }

    async fn del(&self, key: &str) -> Result<(), io::Error> {
        self.do_del(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), io::Error> {
        self.do_sadd(key, member).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, io::Error> {
        self.do_smembers(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), io::Error> {
        self.do_expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<Duration, io::Error> {
        self.do_ttl(key).await
    }

    async fn flush_all(&self) -> Result<(), io::Error> {
        self.do_flush_all().await
    }
}
