//! Shared services behind the tool handlers.

use std::sync::Arc;

use tabdeck_client::fetch::Url;
use tabdeck_client::{
    FaviconResolver, FaviconService, FetchClient, FetchConfig, ImageSearchClient, MetadataResolver, PageSource,
    RecentOptions, ResolverConfig,
};
use tabdeck_core::{
    AppConfig, ChromeHistory, Error, Favorites, HistoryIndex, KeyValueStore, MetadataCache, NoHistory, StoreDb,
    TopSitesProvider,
};

/// Everything a tool call may need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub resolver: MetadataResolver,
    pub favorites: Favorites,
    pub history: Arc<dyn HistoryIndex>,
    pub top_sites: Arc<dyn TopSitesProvider>,
    pub favicons: FaviconResolver,
    pub image_search: ImageSearchClient,
    pub search_url: Url,
    pub recent: RecentOptions,
    pub max_top_sites: usize,
}

fn config_url(field: &str, value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| Error::InvalidUrl(format!("{field}: {e}")))
}

impl AppState {
    /// Open the store and history database named by `config`.
    pub async fn open(config: &AppConfig) -> Result<Self, Error> {
        let store = StoreDb::open(&config.db_path).await?;
        tracing::info!(path = %config.db_path.display(), "opened store");

        let history: Arc<dyn HistoryIndex>;
        let top_sites: Arc<dyn TopSitesProvider>;
        match &config.history_path {
            Some(path) => {
                let chrome = Arc::new(ChromeHistory::open(path).await?);
                tracing::info!(path = %path.display(), "opened browser history");
                history = chrome.clone();
                top_sites = chrome;
            }
            None => {
                tracing::warn!("no history_path configured; history features are empty");
                history = Arc::new(NoHistory);
                top_sites = Arc::new(NoHistory);
            }
        }

        let fetch = FetchClient::new(FetchConfig {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            ..Default::default()
        })?;

        Self::build(config, Arc::new(store), history, top_sites, Arc::new(fetch))
    }

    /// Wire services from already-open collaborators.
    pub fn build(
        config: &AppConfig, store: Arc<dyn KeyValueStore>, history: Arc<dyn HistoryIndex>,
        top_sites: Arc<dyn TopSitesProvider>, fetch: Arc<FetchClient>,
    ) -> Result<Self, Error> {
        let source: Arc<dyn PageSource> = fetch.clone();
        let cache = MetadataCache::new(store.clone(), config.cache_ttl());
        let resolver = MetadataResolver::new(cache, history.clone(), source.clone(), ResolverConfig::from(config));
        let service = FaviconService::try_from(config)?;

        let image_search =
            ImageSearchClient::new(fetch.http().clone(), config_url("image_search_url", &config.image_search_url)?);

        Ok(Self {
            resolver,
            favorites: Favorites::new(store, config.max_favorites),
            history,
            top_sites,
            favicons: FaviconResolver::new(source, service, config.icon_timeout()),
            image_search,
            search_url: config_url("search_url", &config.search_url)?,
            recent: RecentOptions {
                max_sites: config.max_recent,
                window: chrono::Duration::days(config.recent_window_days),
            },
            max_top_sites: config.max_top_sites,
        })
    }
}
