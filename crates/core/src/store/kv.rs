//! `KeyValueStore` implementation over the `kv_store` table.

use super::{KeyValueStore, StoreDb};
use crate::Error;
use async_trait::async_trait;
use serde_json::Value;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

#[async_trait]
impl KeyValueStore for StoreDb {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let key = key.to_string();
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
                match stmt.query_row(params![key], |row| row.get(0)) {
                    Ok(v) => Ok(Some(v)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        raw.map(|s| serde_json::from_str(&s).map_err(Error::from)).transpose()
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        let key = key.to_string();
        let encoded = serde_json::to_string(&value)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![key, encoded, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing() {
        let db = StoreDb::open_in_memory().await.unwrap();
        assert!(db.get("favorites").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.set("favorites", json!([{"id": 1, "title": "Example"}])).await.unwrap();

        let value = db.get("favorites").await.unwrap().unwrap();
        assert_eq!(value[0]["title"], "Example");
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.set("k", json!(1)).await.unwrap();
        db.set("k", json!(2)).await.unwrap();
        assert_eq!(db.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.set("favorites", json!([])).await.unwrap();
        db.set("siteMetadataCache", json!({})).await.unwrap();
        assert_eq!(db.get("favorites").await.unwrap(), Some(json!([])));
        assert_eq!(db.get("siteMetadataCache").await.unwrap(), Some(json!({})));
    }
}
