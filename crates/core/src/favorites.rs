//! Favorite sites list.
//!
//! The list is a single JSON array under [`FAVORITES_KEY`]; every mutation
//! loads it, edits it in memory and writes it back under a lock shared by
//! every clone of [`Favorites`].

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::Error;
use crate::store::{FAVORITES_KEY, KeyValueStore};

/// A user-pinned site tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteSite {
    /// Creation time in epoch milliseconds, unique within the list.
    pub id: i64,
    pub title: String,
    pub url: String,
    /// Uppercased first character of `title`.
    pub icon: String,
}

/// Letter shown for a title: its first character, uppercased.
///
/// Empty titles yield an empty string.
pub fn icon_letter(title: &str) -> String {
    title.trim().chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default()
}

/// Favorites list backed by the key-value store.
#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
    write_lock: Arc<Mutex<()>>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        Self { store, max_entries, write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// All favorites in display order.
    pub async fn list(&self) -> Result<Vec<FavoriteSite>, Error> {
        match self.store.get(FAVORITES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, sites: &[FavoriteSite]) -> Result<(), Error> {
        self.store.set(FAVORITES_KEY, serde_json::to_value(sites)?).await
    }

    /// Append a favorite.
    ///
    /// # Errors
    ///
    /// Returns `Error::FavoritesFull` when the list is at capacity.
    pub async fn add(&self, title: &str, url: &str) -> Result<FavoriteSite, Error> {
        let _guard = self.write_lock.lock().await;
        let mut sites = self.list().await?;
        if sites.len() >= self.max_entries {
            return Err(Error::FavoritesFull(self.max_entries));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let id = sites.iter().map(|s| s.id + 1).fold(now, i64::max);

        let site = FavoriteSite { id, title: title.to_string(), url: url.to_string(), icon: icon_letter(title) };
        sites.push(site.clone());
        self.save(&sites).await?;

        tracing::debug!(id, url, "added favorite");
        Ok(site)
    }

    /// Replace the title and URL of an existing favorite, keeping its position.
    pub async fn edit(&self, id: i64, title: &str, url: &str) -> Result<FavoriteSite, Error> {
        let _guard = self.write_lock.lock().await;
        let mut sites = self.list().await?;
        let site = sites.iter_mut().find(|s| s.id == id).ok_or(Error::FavoriteNotFound(id))?;

        site.title = title.to_string();
        site.url = url.to_string();
        site.icon = icon_letter(title);
        let updated = site.clone();

        self.save(&sites).await?;
        Ok(updated)
    }

    /// Remove a favorite. Removing an unknown id is not an error.
    ///
    /// Returns whether anything was removed.
    pub async fn remove(&self, id: i64) -> Result<bool, Error> {
        let _guard = self.write_lock.lock().await;
        let mut sites = self.list().await?;
        let before = sites.len();
        sites.retain(|s| s.id != id);
        if sites.len() == before {
            return Ok(false);
        }
        self.save(&sites).await?;
        Ok(true)
    }

    /// Move `dragged_id` to the position currently held by `target_id`.
    ///
    /// Unknown ids leave the list untouched.
    pub async fn reorder(&self, dragged_id: i64, target_id: i64) -> Result<Vec<FavoriteSite>, Error> {
        let _guard = self.write_lock.lock().await;
        let mut sites = self.list().await?;
        let dragged = sites.iter().position(|s| s.id == dragged_id);
        let target = sites.iter().position(|s| s.id == target_id);

        let (Some(from), Some(to)) = (dragged, target) else {
            return Ok(sites);
        };
        if from == to {
            return Ok(sites);
        }

        let site = sites.remove(from);
        sites.insert(to, site);
        self.save(&sites).await?;
        Ok(sites)
    }
}
