//! SQLite-backed key-value store.
//!
//! The favorites list and the metadata cache each live under their own
//! key as a JSON document:
//!
//! - `favorites`: array of favorite sites
//! - `siteMetadataCache`: object mapping URL to a timestamped metadata entry

pub mod connection;
pub mod kv;
pub mod migrations;

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;

pub use connection::StoreDb;

/// Key for the persisted favorites list.
pub const FAVORITES_KEY: &str = "favorites";

/// Key for the persisted metadata cache.
pub const METADATA_CACHE_KEY: &str = "siteMetadataCache";

/// Minimal key-value storage contract.
///
/// Writes replace the whole value; there is no partial update or
/// compare-and-swap, so concurrent read-modify-write cycles are last
/// writer wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), Error>;
}
