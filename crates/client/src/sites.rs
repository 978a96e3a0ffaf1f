//! Recently visited and most visited sites.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tabdeck_core::{Error, HistoryIndex, HistoryQuery, TopSite, TopSitesProvider};
use url::Url;

/// History rows requested per site kept, to leave room for filtering.
const RECENT_SCAN_FACTOR: usize = 3;

/// A recently visited page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSite {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub last_visit_time: DateTime<Utc>,
    pub visit_count: i64,
}

/// Options for the recent sites query.
#[derive(Debug, Clone, Copy)]
pub struct RecentOptions {
    pub max_sites: usize,
    pub window: Duration,
}

impl Default for RecentOptions {
    fn default() -> Self {
        Self { max_sites: 10, window: Duration::days(7) }
    }
}

/// Titled, de-duplicated pages visited within the window, newest first.
///
/// Unparseable URLs, browser-internal `chrome:` pages and untitled entries
/// are skipped.
pub async fn recent_sites(
    history: &dyn HistoryIndex, options: RecentOptions, now: DateTime<Utc>,
) -> Result<Vec<RecentSite>, Error> {
    let query = HistoryQuery::new("", options.max_sites * RECENT_SCAN_FACTOR).since(now - options.window);
    let mut items = history.search(&query).await?;
    items.sort_by(|a, b| b.last_visit_time.cmp(&a.last_visit_time));

    let mut sites: Vec<RecentSite> = Vec::new();
    for item in &items {
        let Ok(parsed) = Url::parse(&item.url) else {
            continue;
        };
        if parsed.scheme() == "chrome" {
            continue;
        }
        let Some(title) = item.non_empty_title() else {
            continue;
        };
        if sites.iter().any(|s| s.url == item.url) {
            continue;
        }
        sites.push(RecentSite {
            url: item.url.clone(),
            title: title.to_string(),
            domain: parsed.host_str().unwrap_or_default().to_string(),
            last_visit_time: item.last_visit_time,
            visit_count: item.visit_count,
        });
        if sites.len() == options.max_sites {
            break;
        }
    }
    Ok(sites)
}

/// Delete `url` from history and return the refreshed recent list.
pub async fn remove_recent_site(
    history: &dyn HistoryIndex, url: &str, options: RecentOptions, now: DateTime<Utc>,
) -> Result<Vec<RecentSite>, Error> {
    history.delete_url(url).await?;
    tracing::info!(url, "removed site from history");
    recent_sites(history, options, now).await
}

/// The provider's most visited sites, truncated to `limit`.
pub async fn top_sites(provider: &dyn TopSitesProvider, limit: usize) -> Result<Vec<TopSite>, Error> {
    let mut sites = provider.top_sites().await?;
    sites.truncate(limit);
    Ok(sites)
}
