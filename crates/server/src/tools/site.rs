//! URL formatting, site metadata and favicon tools.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tabdeck_client::{FaviconChain, IconCandidate, ResolvedIcon, format_url};
use tabdeck_core::{Error, MetadataSource};

use super::json_result;
use crate::state::AppState;

/// Input parameters for the format_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FormatUrlParams {
    /// User-entered URL or bare domain.
    pub url: String,
}

/// Output structure for the format_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FormatUrlOutput {
    pub url: String,
    pub host: String,
}

/// Input parameters for the site_metadata tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteMetadataParams {
    /// URL or bare domain to resolve.
    pub url: String,
}

/// Output structure for the site_metadata tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteMetadataOutput {
    /// The normalized URL used as the cache key.
    pub url: String,
    pub title: String,
    /// Where the title came from: history, fetch or hostname.
    pub source: MetadataSource,
}

/// Input parameters for the site_icon tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteIconParams {
    /// Site URL or bare domain.
    pub url: String,

    /// Title used for the letter fallback; the hostname is used when absent.
    #[serde(default)]
    pub title: Option<String>,
}

/// Output structure for the site_icon tool.
#[derive(Debug, Clone, Serialize)]
pub struct SiteIconOutput {
    pub url: String,
    /// The candidate that loaded, or the letter fallback.
    pub icon: ResolvedIcon,
    /// The full fallback chain in the order it is tried.
    pub candidates: Vec<IconCandidate>,
}

pub async fn format_url_impl(params: FormatUrlParams) -> Result<CallToolResult, McpError> {
    let url = format_url(&params.url).map_err(Error::from)?;
    json_result(&FormatUrlOutput { host: url.host_str().unwrap_or_default().to_string(), url: url.to_string() })
}

pub async fn site_metadata_impl(state: &AppState, params: SiteMetadataParams) -> Result<CallToolResult, McpError> {
    let url = format_url(&params.url).map_err(Error::from)?;
    let meta = state.resolver.resolve(url.as_str()).await?;
    json_result(&SiteMetadataOutput { url: url.to_string(), title: meta.title, source: meta.source })
}

/// Resolve a favicon; a loaded image is attached alongside the JSON.
pub async fn site_icon_impl(state: &AppState, params: SiteIconParams) -> Result<CallToolResult, McpError> {
    let url = format_url(&params.url).map_err(Error::from)?;
    let title = params.title.unwrap_or_default();

    let candidates = FaviconChain::new(&url, &title, state.favicons.service()).candidates();
    let icon = state.favicons.resolve(&url, &title).await;
    let image = match &icon {
        ResolvedIcon::Image { mime, bytes, .. } => Some(Content::image(STANDARD.encode(bytes), mime.clone())),
        ResolvedIcon::Glyph { .. } => None,
    };

    let mut result = json_result(&SiteIconOutput { url: url.to_string(), icon, candidates })?;
    result.content.extend(image);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, state};

    #[tokio::test]
    async fn test_format_url_bare_domain() {
        let result = format_url_impl(FormatUrlParams { url: " Example.com ".into() }).await.unwrap();
        let json = output(&result);
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["host"], "example.com");
    }

    #[tokio::test]
    async fn test_format_url_invalid() {
        let err = format_url_impl(FormatUrlParams { url: "ftp://example.com".into() }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32003));
    }

    #[tokio::test]
    async fn test_site_metadata_rejects_invalid_url() {
        let state = state().await;
        let err = site_metadata_impl(&state, SiteMetadataParams { url: "not a url".into() }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32003));
    }

    #[tokio::test]
    async fn test_site_icon_rejects_invalid_url() {
        let state = state().await;
        let err = site_icon_impl(&state, SiteIconParams { url: "".into(), title: None }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32003));
    }
}
