//! Browser-side collaborators: history, top sites and tab opening.
//!
//! These are consumed through traits so the pipeline can run against a
//! real Chrome profile, an empty stand-in, or test fakes.

pub mod history;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

pub use history::ChromeHistory;

/// A history search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Substring matched against URL or title; empty matches everything.
    pub text: String,
    pub max_results: usize,
    /// Only visits at or after this instant; `None` searches all history.
    pub start_time: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    pub fn new(text: impl Into<String>, max_results: usize) -> Self {
        Self { text: text.into(), max_results, start_time: None }
    }

    pub fn since(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }
}

/// One history entry, most recent visit first in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryItem {
    pub url: String,
    pub title: Option<String>,
    pub visit_count: i64,
    pub last_visit_time: DateTime<Utc>,
}

impl HistoryItem {
    /// The title with surrounding whitespace removed, if any remains.
    pub fn non_empty_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A most-visited site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TopSite {
    pub url: String,
    pub title: String,
}

/// Local browsing history index.
#[async_trait]
pub trait HistoryIndex: Send + Sync {
    /// Entries matching `query`, ordered most recent visit first.
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>, Error>;

    /// Remove every visit to `url`.
    async fn delete_url(&self, url: &str) -> Result<(), Error>;
}

/// Source of most-visited sites.
#[async_trait]
pub trait TopSitesProvider: Send + Sync {
    async fn top_sites(&self) -> Result<Vec<TopSite>, Error>;
}

/// Opens a URL in a new browser tab.
#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<(), Error>;
}

/// Stand-in used when no history database is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

#[async_trait]
impl HistoryIndex for NoHistory {
    async fn search(&self, _query: &HistoryQuery) -> Result<Vec<HistoryItem>, Error> {
        Ok(Vec::new())
    }

    async fn delete_url(&self, _url: &str) -> Result<(), Error> {
        Ok(())
    }
}

#[async_trait]
impl TopSitesProvider for NoHistory {
    async fn top_sites(&self) -> Result<Vec<TopSite>, Error> {
        Ok(Vec::new())
    }
}
