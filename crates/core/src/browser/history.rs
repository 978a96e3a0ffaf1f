//! History and top sites read from a Chrome profile's `History` database.
//!
//! Chrome stores visit times as microseconds since 1601-01-01 UTC in the
//! `urls` table. Chrome holds a lock on the live file while running, so
//! point this at a copy when the browser is open.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::{Connection, params};

use super::{HistoryIndex, HistoryItem, HistoryQuery, TopSite, TopSitesProvider};
use crate::Error;

/// Seconds between 1601-01-01 and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Upper bound on rows returned by `top_sites`.
const TOP_SITES_LIMIT: i64 = 100;

fn webkit_to_utc(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros - WEBKIT_EPOCH_OFFSET_SECS * 1_000_000).unwrap_or(DateTime::UNIX_EPOCH)
}

fn utc_to_webkit(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros() + WEBKIT_EPOCH_OFFSET_SECS * 1_000_000
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Chrome `History` database handle.
#[derive(Clone, Debug)]
pub struct ChromeHistory {
    conn: Connection,
}

impl ChromeHistory {
    /// Open an existing Chrome `History` file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        conn.call(|conn| conn.busy_timeout(Duration::from_secs(2)))
            .await
            .map_err(Error::Database)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with Chrome's `urls` schema, for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE urls (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url LONGVARCHAR,
                    title LONGVARCHAR,
                    visit_count INTEGER DEFAULT 0 NOT NULL,
                    typed_count INTEGER DEFAULT 0 NOT NULL,
                    last_visit_time INTEGER NOT NULL,
                    hidden INTEGER DEFAULT 0 NOT NULL
                );
                CREATE TABLE visits (
                    id INTEGER PRIMARY KEY,
                    url INTEGER NOT NULL,
                    visit_time INTEGER NOT NULL
                );",
            )
        })
        .await
        .map_err(Error::Database)?;
        Ok(Self { conn })
    }

    /// Insert a `urls` row and one matching visit.
    pub async fn record_visit(
        &self, url: &str, title: Option<&str>, visit_count: i64, last_visit: DateTime<Utc>,
    ) -> Result<(), Error> {
        let url = url.to_string();
        let title = title.map(str::to_string);
        let when = utc_to_webkit(last_visit);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, ?2, ?3, ?4)",
                    params![url, title, visit_count, when],
                )?;
                let id = conn.last_insert_rowid();
                conn.execute("INSERT INTO visits (url, visit_time) VALUES (?1, ?2)", params![id, when])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl HistoryIndex for ChromeHistory {
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>, Error> {
        let text = query.text.clone();
        let pattern = like_pattern(&query.text);
        let since = query.start_time.map(utc_to_webkit).unwrap_or(0);
        let limit = query.max_results as i64;

        self.conn
            .call(move |conn| -> Result<Vec<HistoryItem>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, title, visit_count, last_visit_time FROM urls
                     WHERE hidden = 0
                       AND last_visit_time >= ?1
                       AND (?2 = '' OR url LIKE ?3 ESCAPE '\\' OR title LIKE ?3 ESCAPE '\\')
                     ORDER BY last_visit_time DESC
                     LIMIT ?4",
                )?;

                let rows = stmt.query_map(params![since, text, pattern, limit], |row| {
                    Ok(HistoryItem {
                        url: row.get(0)?,
                        title: row.get(1)?,
                        visit_count: row.get(2)?,
                        last_visit_time: webkit_to_utc(row.get(3)?),
                    })
                })?;

                let mut items = Vec::new();
                for row in rows {
                    items.push(row?);
                }
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_url(&self, url: &str) -> Result<(), Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let has_visits: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='visits')",
                    [],
                    |row| row.get(0),
                )?;
                if has_visits {
                    conn.execute("DELETE FROM visits WHERE url IN (SELECT id FROM urls WHERE url = ?1)", params![url])?;
                }
                let removed = conn.execute("DELETE FROM urls WHERE url = ?1", params![url])?;
                tracing::debug!(url, removed, "deleted history url");
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl TopSitesProvider for ChromeHistory {
    async fn top_sites(&self) -> Result<Vec<TopSite>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<TopSite>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, COALESCE(title, '') FROM urls
                     WHERE hidden = 0 AND visit_count > 0
                     ORDER BY visit_count DESC, last_visit_time DESC
                     LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![TOP_SITES_LIMIT], |row| {
                    Ok(TopSite { url: row.get(0)?, title: row.get(1)? })
                })?;

                let mut sites = Vec::new();
                for row in rows {
                    sites.push(row?);
                }
                Ok(sites)
            })
            .await
            .map_err(Error::from)
    }
}
