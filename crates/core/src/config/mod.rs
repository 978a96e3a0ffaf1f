//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TABDECK_*)
//! 2. TOML config file (if TABDECK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (TABDECK_*)
/// 2. TOML config file (if TABDECK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite key-value store (favorites and metadata cache).
    ///
    /// Set via TABDECK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to a Chrome `History` database.
    ///
    /// When unset, history lookups, recent sites and top sites are empty.
    #[serde(default)]
    pub history_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes read from a page or icon body.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Reachability probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Title fetch timeout in milliseconds (applies to both title requests).
    #[serde(default = "default_title_timeout_ms")]
    pub title_timeout_ms: u64,

    /// Per-candidate load timeout used when resolving favicons server-side.
    #[serde(default = "default_icon_timeout_ms")]
    pub icon_timeout_ms: u64,

    /// Metadata cache time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// External favicon lookup service base URL.
    #[serde(default = "default_favicon_service_url")]
    pub favicon_service_url: String,

    /// Icon size requested from the lookup service.
    #[serde(default = "default_favicon_size")]
    pub favicon_size: u32,

    /// Search engine results page; the query goes into `text`.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Reverse image search upload endpoint.
    #[serde(default = "default_image_search_url")]
    pub image_search_url: String,

    #[serde(default = "default_max_favorites")]
    pub max_favorites: usize,

    #[serde(default = "default_max_recent")]
    pub max_recent: usize,

    /// How far back recent sites reach, in days.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,

    #[serde(default = "default_max_top_sites")]
    pub max_top_sites: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./tabdeck.sqlite")
}

fn default_user_agent() -> String {
    "tabdeck/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_title_timeout_ms() -> u64 {
    5_000
}

fn default_icon_timeout_ms() -> u64 {
    5_000
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_favicon_service_url() -> String {
    "https://www.google.com/s2/favicons".into()
}

fn default_favicon_size() -> u32 {
    64
}

fn default_search_url() -> String {
    "https://yandex.ru/search/".into()
}

fn default_image_search_url() -> String {
    "https://yandex.ru/images/search".into()
}

fn default_max_favorites() -> usize {
    15
}

fn default_max_recent() -> usize {
    10
}

fn default_recent_window_days() -> i64 {
    7
}

fn default_max_top_sites() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            history_path: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            probe_timeout_ms: default_probe_timeout_ms(),
            title_timeout_ms: default_title_timeout_ms(),
            icon_timeout_ms: default_icon_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            favicon_service_url: default_favicon_service_url(),
            favicon_size: default_favicon_size(),
            search_url: default_search_url(),
            image_search_url: default_image_search_url(),
            max_favorites: default_max_favorites(),
            max_recent: default_max_recent(),
            recent_window_days: default_recent_window_days(),
            max_top_sites: default_max_top_sites(),
        }
    }
}

impl AppConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn title_timeout(&self) -> Duration {
        Duration::from_millis(self.title_timeout_ms)
    }

    pub fn icon_timeout(&self) -> Duration {
        Duration::from_millis(self.icon_timeout_ms)
    }

    /// Cache TTL as a chrono duration, for comparing against stored timestamps.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TABDECK_`
    /// 2. TOML file from `TABDECK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TABDECK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TABDECK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
