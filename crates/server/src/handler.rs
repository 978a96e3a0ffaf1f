//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::favorites::{
    self, FavoriteAddParams, FavoriteEditParams, FavoriteRemoveParams, FavoriteReorderParams,
};
use crate::tools::search::{
    ImageSearchParams, SuggestParams, WebSearchParams, image_search_impl, suggest_impl, web_search_impl,
};
use crate::tools::site::{
    FormatUrlParams, SiteIconParams, SiteMetadataParams, format_url_impl, site_icon_impl, site_metadata_impl,
};
use crate::tools::sites::{RecentRemoveParams, recent_impl, recent_remove_impl, top_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for tabdeck.
#[derive(Clone)]
pub struct TabdeckServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl TabdeckServer {
    /// Create a new server handler.
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    #[tool(description = "Normalize a user-entered URL or bare domain to an absolute http(s) URL.")]
    async fn format_url(&self, params: Parameters<FormatUrlParams>) -> Result<CallToolResult, McpError> {
        format_url_impl(params.0).await
    }

    /// Resolve a display title for a site.
    ///
    /// Checks the cache, then browser history, then the network. Fails only
    /// for an invalid URL or an unreachable site.
    #[tool(
        description = "Resolve a site's display title. Returns the title and its source: history, fetch or hostname."
    )]
    async fn site_metadata(&self, params: Parameters<SiteMetadataParams>) -> Result<CallToolResult, McpError> {
        site_metadata_impl(&self.state, params.0).await
    }

    #[tool(description = "Resolve a site's favicon through its fallback chain. Returns the icon and the chain tried.")]
    async fn site_icon(&self, params: Parameters<SiteIconParams>) -> Result<CallToolResult, McpError> {
        site_icon_impl(&self.state, params.0).await
    }

    #[tool(description = "List favorite sites in display order.")]
    async fn favorites_list(&self) -> Result<CallToolResult, McpError> {
        favorites::list_impl(&self.state).await
    }

    #[tool(description = "Add a favorite site. A missing title is resolved from the site.")]
    async fn favorites_add(&self, params: Parameters<FavoriteAddParams>) -> Result<CallToolResult, McpError> {
        favorites::add_impl(&self.state, params.0).await
    }

    #[tool(description = "Change a favorite's URL and title, keeping its position.")]
    async fn favorites_edit(&self, params: Parameters<FavoriteEditParams>) -> Result<CallToolResult, McpError> {
        favorites::edit_impl(&self.state, params.0).await
    }

    #[tool(description = "Remove a favorite by id.")]
    async fn favorites_remove(&self, params: Parameters<FavoriteRemoveParams>) -> Result<CallToolResult, McpError> {
        favorites::remove_impl(&self.state, params.0).await
    }

    #[tool(description = "Move a favorite to the position of another favorite.")]
    async fn favorites_reorder(&self, params: Parameters<FavoriteReorderParams>) -> Result<CallToolResult, McpError> {
        favorites::reorder_impl(&self.state, params.0).await
    }

    #[tool(description = "Recently visited sites from browser history, newest first.")]
    async fn recent_sites(&self) -> Result<CallToolResult, McpError> {
        recent_impl(&self.state).await
    }

    #[tool(description = "Delete a URL from browser history and return the updated recent sites.")]
    async fn recent_remove(&self, params: Parameters<RecentRemoveParams>) -> Result<CallToolResult, McpError> {
        recent_remove_impl(&self.state, params.0).await
    }

    #[tool(description = "Most visited sites.")]
    async fn top_sites(&self) -> Result<CallToolResult, McpError> {
        top_impl(&self.state).await
    }

    #[tool(description = "History suggestions for a partial query from the last day.")]
    async fn search_suggest(&self, params: Parameters<SuggestParams>) -> Result<CallToolResult, McpError> {
        suggest_impl(&self.state, params.0).await
    }

    #[tool(description = "Build a web search for a query. Returns the URL to open.")]
    async fn web_search(&self, params: Parameters<WebSearchParams>) -> Result<CallToolResult, McpError> {
        web_search_impl(&self.state, params.0).await
    }

    #[tool(description = "Upload a base64 image for reverse image search. Returns the results URL to open.")]
    async fn image_search(&self, params: Parameters<ImageSearchParams>) -> Result<CallToolResult, McpError> {
        image_search_impl(&self.state, params.0).await
    }
}

impl ServerHandler for TabdeckServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "tabdeck".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
