//! History suggestions and web search.

pub mod image;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tabdeck_core::{Error, HistoryIndex, HistoryQuery, TabOpener};
use url::Url;

pub use image::{ImageSearchClient, ImageSearchError, ImageUpload};

/// Queries shorter than this get no suggestions.
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Maximum suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// A history entry offered while typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Page title, or the URL when the page is untitled.
    pub label: String,
    pub url: String,
}

/// History entries from the last day matching `query`.
pub async fn suggestions(
    history: &dyn HistoryIndex, query: &str, now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, Error> {
    let query = query.trim();
    if query.chars().count() < MIN_SUGGEST_CHARS {
        return Ok(Vec::new());
    }

    let items = history
        .search(&HistoryQuery::new(query, MAX_SUGGESTIONS).since(now - Duration::hours(24)))
        .await?;
    Ok(items
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|item| Suggestion {
            label: item.non_empty_title().map(str::to_string).unwrap_or_else(|| item.url.clone()),
            url: item.url,
        })
        .collect())
}

/// The search engine URL for `query`, or `None` when the query is blank.
pub fn search_url(base: &Url, query: &str) -> Option<Url> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("text", query);
    Some(url)
}

/// Open a search for `query` in a new tab. Blank queries open nothing.
pub async fn open_search(opener: &dyn TabOpener, base: &Url, query: &str) -> Result<Option<Url>, Error> {
    let Some(url) = search_url(base, query) else {
        return Ok(None);
    };
    opener.open_tab(url.as_str()).await?;
    tracing::info!(%url, "opened web search");
    Ok(Some(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHistory, RecordingOpener};
    use tabdeck_core::HistoryItem;

    fn base() -> Url {
        Url::parse("https://yandex.ru/search/").unwrap()
    }

    fn item(url: &str, title: Option<&str>, minutes_ago: i64) -> HistoryItem {
        HistoryItem {
            url: url.into(),
            title: title.map(Into::into),
            visit_count: 1,
            last_visit_time: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_short_query_skips_history() {
        let history = FakeHistory::default();
        assert!(suggestions(&history, " r ", Utc::now()).await.unwrap().is_empty());
        assert_eq!(history.search_count(), 0);
    }

    #[tokio::test]
    async fn test_suggestions_label_and_window() {
        let history = FakeHistory::with_items(vec![
            item("https://rust-lang.org/", Some("Rust"), 10),
            item("https://rust.example/untitled", None, 20),
            item("https://rust.example/old", Some("Old"), 60 * 48),
        ]);

        let found = suggestions(&history, "rust", Utc::now()).await.unwrap();
        assert_eq!(
            found,
            vec![
                Suggestion { label: "Rust".into(), url: "https://rust-lang.org/".into() },
                Suggestion { label: "https://rust.example/untitled".into(), url: "https://rust.example/untitled".into() },
            ]
        );
        assert_eq!(history.last_query().unwrap().max_results, MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn test_suggestions_capped() {
        let items = (0..8).map(|i| item(&format!("https://docs{i}.example/"), Some("Docs"), i)).collect();
        let history = FakeHistory::with_items(items);
        assert_eq!(suggestions(&history, "docs", Utc::now()).await.unwrap().len(), 5);
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url(&base(), "  rust async & tokio ").unwrap();
        assert_eq!(url.as_str(), "https://yandex.ru/search/?text=rust+async+%26+tokio");
        assert!(search_url(&base(), "   ").is_none());
    }

    #[tokio::test]
    async fn test_open_search() {
        let opener = RecordingOpener::default();
        let opened = open_search(&opener, &base(), "rust").await.unwrap();
        assert_eq!(opened.unwrap().as_str(), "https://yandex.ru/search/?text=rust");
        assert_eq!(opener.opened(), vec!["https://yandex.ru/search/?text=rust"]);

        assert!(open_search(&opener, &base(), "").await.unwrap().is_none());
        assert_eq!(opener.opened().len(), 1);
    }
}
