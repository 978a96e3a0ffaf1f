//! Recent and top site tools.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabdeck_client::{RecentSite, recent_sites, remove_recent_site, top_sites};
use tabdeck_core::{Error, TopSite};

use super::json_result;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecentRemoveParams {
    /// Exact history URL to delete.
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSitesOutput {
    pub sites: Vec<RecentSite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSitesOutput {
    pub sites: Vec<TopSite>,
}

pub async fn recent_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let sites = recent_sites(state.history.as_ref(), state.recent, Utc::now()).await?;
    json_result(&RecentSitesOutput { sites })
}

pub async fn recent_remove_impl(state: &AppState, params: RecentRemoveParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    let sites = remove_recent_site(state.history.as_ref(), &params.url, state.recent, Utc::now()).await?;
    json_result(&RecentSitesOutput { sites })
}

pub async fn top_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let sites = top_sites(state.top_sites.as_ref(), state.max_top_sites).await?;
    json_result(&TopSitesOutput { sites })
}
