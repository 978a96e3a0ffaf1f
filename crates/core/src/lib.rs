//! Core types and shared functionality for tabdeck.
//!
//! This crate provides:
//! - SQLite key-value store holding favorites and the metadata cache
//! - Time-limited metadata cache
//! - Favorites list operations
//! - Browser collaborator traits (history, top sites, tabs)
//! - Unified error types
//! - Configuration structures

pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod favorites;
pub mod metadata;
pub mod store;

pub use browser::{
    ChromeHistory, HistoryIndex, HistoryItem, HistoryQuery, NoHistory, TabOpener, TopSite, TopSitesProvider,
};
pub use cache::{CacheEntry, MetadataCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use favorites::{FavoriteSite, Favorites, icon_letter};
pub use metadata::{Metadata, MetadataSource};
pub use store::{KeyValueStore, StoreDb};
