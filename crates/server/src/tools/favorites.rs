//! Favorite site tools.
//!
//! URLs are normalized before they are stored. When no title is given the
//! site's title is resolved the same way `site_metadata` does, so an
//! unreachable site cannot be added untitled.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabdeck_client::format_url;
use tabdeck_core::{Error, FavoriteSite};

use super::json_result;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteAddParams {
    /// Site URL or bare domain.
    pub url: String,

    /// Tile title; resolved from the site when absent or blank.
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteEditParams {
    /// Id of the favorite to change.
    pub id: i64,

    /// New site URL or bare domain.
    pub url: String,

    /// New title; resolved from the site when absent or blank.
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteRemoveParams {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteReorderParams {
    /// Favorite being moved.
    pub dragged_id: i64,

    /// Favorite whose position it takes.
    pub target_id: i64,
}

/// Output structure for tools returning the whole list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoritesOutput {
    pub favorites: Vec<FavoriteSite>,
    pub max_favorites: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteRemoveOutput {
    pub removed: bool,
    pub favorites: Vec<FavoriteSite>,
}

/// Normalized URL plus a non-blank title.
async fn titled(state: &AppState, url: &str, title: Option<String>) -> Result<(String, String), Error> {
    let url = format_url(url)?.to_string();
    match title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => Ok((url, title.to_string())),
        None => {
            let meta = state.resolver.resolve(&url).await?;
            Ok((url, meta.title))
        }
    }
}

pub async fn list_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let favorites = state.favorites.list().await?;
    json_result(&FavoritesOutput { favorites, max_favorites: state.favorites.max_entries() })
}

pub async fn add_impl(state: &AppState, params: FavoriteAddParams) -> Result<CallToolResult, McpError> {
    let current = state.favorites.list().await?;
    if current.len() >= state.favorites.max_entries() {
        return Err(Error::FavoritesFull(state.favorites.max_entries()).into());
    }

    let (url, title) = titled(state, &params.url, params.title).await?;
    let site = state.favorites.add(&title, &url).await?;
    tracing::info!(id = site.id, url = %site.url, "favorite added");
    json_result(&site)
}

pub async fn edit_impl(state: &AppState, params: FavoriteEditParams) -> Result<CallToolResult, McpError> {
    if !state.favorites.list().await?.iter().any(|s| s.id == params.id) {
        return Err(Error::FavoriteNotFound(params.id).into());
    }

    let (url, title) = titled(state, &params.url, params.title).await?;
    let site = state.favorites.edit(params.id, &title, &url).await?;
    json_result(&site)
}

pub async fn remove_impl(state: &AppState, params: FavoriteRemoveParams) -> Result<CallToolResult, McpError> {
    let removed = state.favorites.remove(params.id).await?;
    let favorites = state.favorites.list().await?;
    json_result(&FavoriteRemoveOutput { removed, favorites })
}

pub async fn reorder_impl(state: &AppState, params: FavoriteReorderParams) -> Result<CallToolResult, McpError> {
    state.favorites.reorder(params.dragged_id, params.target_id).await?;
    list_impl(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, state};

    fn add(url: &str, title: &str) -> FavoriteAddParams {
        FavoriteAddParams { url: url.into(), title: Some(title.into()) }
    }

    fn ids(json: &serde_json::Value) -> Vec<i64> {
        json["favorites"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_add_normalizes_url_and_sets_icon() {
        let state = state().await;
        let result = add_impl(&state, add("rust-lang.org", "rust")).await.unwrap();
        let json = output(&result);
        assert_eq!(json["url"], "https://rust-lang.org/");
        assert_eq!(json["title"], "rust");
        assert_eq!(json["icon"], "R");

        let list = output(&list_impl(&state).await.unwrap());
        assert_eq!(list["favorites"].as_array().unwrap().len(), 1);
        assert_eq!(list["max_favorites"], 15);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_url() {
        let state = state().await;
        let err = add_impl(&state, add("not a url", "x")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32003));
    }

    #[tokio::test]
    async fn test_add_when_full() {
        let state = state().await;
        for i in 0..15 {
            add_impl(&state, add(&format!("site{i}.example"), "Site")).await.unwrap();
        }
        let err = add_impl(&state, FavoriteAddParams { url: "one-more.example".into(), title: None })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode(-32010));
    }

    #[tokio::test]
    async fn test_edit_and_remove() {
        let state = state().await;
        let id = output(&add_impl(&state, add("a.example", "A")).await.unwrap())["id"].as_i64().unwrap();

        let edited = output(
            &edit_impl(&state, FavoriteEditParams { id, url: "b.example".into(), title: Some("bee".into()) })
                .await
                .unwrap(),
        );
        assert_eq!(edited["url"], "https://b.example/");
        assert_eq!(edited["icon"], "B");

        let removed = output(&remove_impl(&state, FavoriteRemoveParams { id }).await.unwrap());
        assert_eq!(removed["removed"], true);
        assert!(removed["favorites"].as_array().unwrap().is_empty());

        let err = edit_impl(&state, FavoriteEditParams { id, url: "c.example".into(), title: Some("C".into()) })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode(-32011));
    }

    #[tokio::test]
    async fn test_edit_unknown_id_skips_resolution() {
        let state = state().await;
        let params = FavoriteEditParams { id: 42, url: "tabdeck-no-such-host.invalid".into(), title: None };
        let err = edit_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32011));
    }

    #[tokio::test]
    async fn test_reorder() {
        let state = state().await;
        let mut added = Vec::new();
        for name in ["a", "b", "c"] {
            let json = output(&add_impl(&state, add(&format!("{name}.example"), name)).await.unwrap());
            added.push(json["id"].as_i64().unwrap());
        }

        let json = output(
            &reorder_impl(&state, FavoriteReorderParams { dragged_id: added[2], target_id: added[0] })
                .await
                .unwrap(),
        );
        assert_eq!(ids(&json), vec![added[2], added[0], added[1]]);
    }
}
