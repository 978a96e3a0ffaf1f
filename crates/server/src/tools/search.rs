//! Suggestion, web search and reverse image search tools.
//!
//! Search tools report the tabs they would open in `opened`; the MCP client
//! decides how to present them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabdeck_client::{ImageUpload, Suggestion, open_search, suggestions};

use super::json_result;
use crate::error::ToolError;
use crate::state::AppState;
use crate::tabs::TabCollector;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestParams {
    /// Text typed so far; fewer than two characters yields nothing.
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestOutput {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageSearchParams {
    /// Image bytes, base64-encoded.
    pub image_base64: String,

    /// File name sent with the upload.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "image".into()
}

/// Output structure for tools that open tabs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenedOutput {
    pub opened: Vec<String>,
}

pub async fn suggest_impl(state: &AppState, params: SuggestParams) -> Result<CallToolResult, McpError> {
    let suggestions = suggestions(state.history.as_ref(), &params.query, Utc::now()).await?;
    json_result(&SuggestOutput { suggestions })
}

pub async fn web_search_impl(state: &AppState, params: WebSearchParams) -> Result<CallToolResult, McpError> {
    let tabs = TabCollector::default();
    open_search(&tabs, &state.search_url, &params.query).await?;
    json_result(&OpenedOutput { opened: tabs.into_opened() })
}

pub async fn image_search_impl(state: &AppState, params: ImageSearchParams) -> Result<CallToolResult, McpError> {
    let bytes = STANDARD
        .decode(params.image_base64.trim())
        .map_err(|e| ToolError::InvalidInput(format!("image_base64: {e}")))?;

    let tabs = TabCollector::default();
    state
        .image_search
        .search_and_open(&tabs, ImageUpload::new(bytes, params.file_name))
        .await
        .map_err(tabdeck_core::Error::from)?;
    json_result(&OpenedOutput { opened: tabs.into_opened() })
}
