//! Time-limited metadata cache persisted in the key-value store.
//!
//! All entries share one JSON object under [`METADATA_CACHE_KEY`]. Entries
//! are never deleted: a stale entry reads as absent and is overwritten by
//! the next successful resolution of the same URL.
//!
//! Writes are read-modify-write on that object, so clones of one
//! [`MetadataCache`] serialize them behind a shared lock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::Error;
use crate::metadata::Metadata;
use crate::store::{KeyValueStore, METADATA_CACHE_KEY};

/// A cached resolution result with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Metadata,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp < ttl
    }
}

/// Metadata cache handle, built once and shared with the resolver.
#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    write_lock: Arc<Mutex<()>>,
}

impl MetadataCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl, write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn load(&self) -> Result<Map<String, Value>, Error> {
        match self.store.get(METADATA_CACHE_KEY).await? {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => {
                tracing::warn!("metadata cache is not a JSON object; treating as empty");
                Ok(Map::new())
            }
            None => Ok(Map::new()),
        }
    }

    /// Get the entry stored for `url`, fresh or not.
    ///
    /// An entry that no longer decodes is reported as absent.
    pub async fn get(&self, url: &str) -> Result<Option<CacheEntry>, Error> {
        let mut map = self.load().await?;
        let Some(raw) = map.remove(url) else {
            return Ok(None);
        };
        match serde_json::from_value(raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(url, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Get the cached metadata for `url` if it is younger than the TTL at `now`.
    pub async fn get_fresh(&self, url: &str, now: DateTime<Utc>) -> Result<Option<Metadata>, Error> {
        Ok(self
            .get(url)
            .await?
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.data))
    }

    /// Store `data` for `url`, stamped with the current time.
    pub async fn put(&self, url: &str, data: &Metadata) -> Result<(), Error> {
        self.put_at(url, data, Utc::now()).await
    }

    /// Store `data` for `url` with an explicit timestamp.
    pub async fn put_at(&self, url: &str, data: &Metadata, timestamp: DateTime<Utc>) -> Result<(), Error> {
        let entry = CacheEntry { data: data.clone(), timestamp };
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        map.insert(url.to_string(), serde_json::to_value(&entry)?);
        self.store.set(METADATA_CACHE_KEY, Value::Object(map)).await
    }
}
