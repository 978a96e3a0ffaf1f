//! Network side of tabdeck.
//!
//! This crate provides URL formatting, the bounded fetcher, title
//! extraction, the metadata resolver, favicon fallback, history-backed site
//! lists and search helpers used by the server.

pub mod extract;
pub mod favicon;
pub mod fetch;
pub mod metadata;
pub mod search;
pub mod sites;

#[cfg(test)]
mod testing;

pub use extract::{extract_title, sanitize};
pub use favicon::{FaviconChain, FaviconResolver, FaviconService, IconCandidate, ResolvedIcon, glyph_for};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageSource, Probe, UrlError, format_url, hostname};
pub use metadata::{MetadataResolver, ResolverConfig, fetch_title};
pub use search::{ImageSearchClient, ImageSearchError, ImageUpload, Suggestion, open_search, search_url, suggestions};
pub use sites::{RecentOptions, RecentSite, recent_sites, remove_recent_site, top_sites};
