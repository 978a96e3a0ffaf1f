//! Site metadata resolution.
//!
//! Given user input, produce a display title through a fixed chain:
//!
//! 1. Normalize the URL (invalid input fails before any I/O)
//! 2. Fresh cache entry, keyed by the normalized URL
//! 3. Title of the most recent matching history entry
//! 4. HEAD probe; an unreachable site fails and nothing is cached
//! 5. Page title, falling back to the hostname
//!
//! Steps 3 and 5 write their result back to the cache. Cache and history
//! failures are logged and skipped, never surfaced.

mod title;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabdeck_core::{AppConfig, Error, HistoryIndex, HistoryQuery, Metadata, MetadataCache, MetadataSource};
use url::Url;

use crate::fetch::{PageSource, Probe, format_url, hostname};

pub use title::fetch_title;

/// Deadlines for the network steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// HEAD reachability probe (default: 3s)
    pub probe_timeout: Duration,
    /// HTML probe and page fetch, each (default: 5s)
    pub title_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { probe_timeout: Duration::from_millis(3000), title_timeout: Duration::from_millis(5000) }
    }
}

impl From<&AppConfig> for ResolverConfig {
    fn from(config: &AppConfig) -> Self {
        Self { probe_timeout: config.probe_timeout(), title_timeout: config.title_timeout() }
    }
}

/// Resolves titles for sites, consulting cache and history before the network.
#[derive(Clone)]
pub struct MetadataResolver {
    cache: MetadataCache,
    history: Arc<dyn HistoryIndex>,
    source: Arc<dyn PageSource>,
    config: ResolverConfig,
}

impl MetadataResolver {
    pub fn new(
        cache: MetadataCache, history: Arc<dyn HistoryIndex>, source: Arc<dyn PageSource>, config: ResolverConfig,
    ) -> Self {
        Self { cache, history, source, config }
    }

    /// Resolve a display title for `input`.
    ///
    /// Fails with [`Error::InvalidUrl`] when the input cannot be normalized
    /// and with [`Error::Unreachable`] when the site does not answer the
    /// probe. Every other failure degrades to a hostname title.
    pub async fn resolve(&self, input: &str) -> Result<Metadata, Error> {
        let url = format_url(input)?;
        let key = url.as_str();

        match self.cache.get_fresh(key, Utc::now()).await {
            Ok(Some(hit)) => {
                tracing::debug!(url = key, source = hit.source.as_str(), "metadata cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(url = key, error = %e, "metadata cache read failed"),
        }

        if let Some(meta) = self.from_history(&url).await {
            self.remember(key, &meta).await;
            return Ok(meta);
        }

        if let Err(e) = self.source.probe(&url, &Probe::head(self.config.probe_timeout)).await {
            tracing::warn!(url = key, error = %e, "site unreachable");
            return Err(Error::Unreachable(format!(
                "{} is unavailable. Check your connection or try again later.",
                hostname(&url)
            )));
        }

        let meta = match fetch_title(self.source.as_ref(), &url, self.config.title_timeout).await {
            Ok(meta) => meta,
            Err(e) => {
                if e.is_fetch_failure() {
                    tracing::warn!(url = key, error = %e, "title fetch failed, using hostname");
                } else {
                    tracing::debug!(url = key, error = %e, "no title, using hostname");
                }
                Metadata::new(hostname(&url), MetadataSource::Hostname)
            }
        };

        self.remember(key, &meta).await;
        Ok(meta)
    }

    async fn from_history(&self, url: &Url) -> Option<Metadata> {
        match self.history.search(&HistoryQuery::new(url.as_str(), 1)).await {
            Ok(items) => items
                .first()
                .and_then(|item| item.non_empty_title())
                .map(|title| Metadata::new(title, MetadataSource::History)),
            Err(e) => {
                tracing::warn!(%url, error = %e, "history lookup failed");
                None
            }
        }
    }

    async fn remember(&self, key: &str, meta: &Metadata) {
        if let Err(e) = self.cache.put(key, meta).await {
            tracing::warn!(url = key, error = %e, "metadata cache write failed");
        }
    }
}
