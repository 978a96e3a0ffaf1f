use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tabdeck_core::Error;
use url::Url;

use super::{FaviconChain, FaviconService, IconCandidate};
use crate::fetch::{FetchResponse, PageSource};

const SVG_MIME: &str = "image/svg+xml";

/// The icon a chain settled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedIcon {
    Image {
        url: Url,
        mime: String,
        #[serde(skip)]
        bytes: Bytes,
    },
    Glyph {
        letter: String,
    },
}

/// Walks a [`FaviconChain`] by actually loading each candidate.
///
/// Each attempt is bounded by `load_timeout`; a response that is not an
/// image counts as a failed load.
#[derive(Clone)]
pub struct FaviconResolver {
    source: Arc<dyn PageSource>,
    service: FaviconService,
    load_timeout: Duration,
}

impl FaviconResolver {
    pub fn new(source: Arc<dyn PageSource>, service: FaviconService, load_timeout: Duration) -> Self {
        Self { source, service, load_timeout }
    }

    pub fn service(&self) -> &FaviconService {
        &self.service
    }

    pub async fn resolve(&self, site: &Url, title: &str) -> ResolvedIcon {
        let mut chain = FaviconChain::new(site, title, &self.service);
        loop {
            let candidate = chain.current();
            let url = match &candidate {
                IconCandidate::Glyph(letter) => {
                    tracing::debug!(%site, letter, "favicon fell back to glyph");
                    return ResolvedIcon::Glyph { letter: letter.clone() };
                }
                IconCandidate::Local(url) | IconCandidate::Service(url) => url,
            };

            match self.load(url).await {
                Ok((mime, bytes)) => {
                    tracing::debug!(%site, icon = %url, mime, "favicon loaded");
                    return ResolvedIcon::Image { url: url.clone(), mime, bytes };
                }
                Err(e) => {
                    tracing::debug!(%site, icon = %url, error = %e, "favicon candidate failed");
                    chain.on_load_error();
                }
            }
        }
    }

    async fn load(&self, url: &Url) -> Result<(String, Bytes), Error> {
        let response = self.source.fetch_image(url, self.load_timeout).await?;
        let mime = image_mime(&response).ok_or_else(|| Error::HttpError(format!("{url}: not an image")))?;
        Ok((mime, response.bytes))
    }
}

/// Sniff the body; SVG is text so it is recognized by header or markup.
fn image_mime(response: &FetchResponse) -> Option<String> {
    if response.bytes.is_empty() {
        return None;
    }
    if let Some(kind) = infer::get(&response.bytes)
        && kind.matcher_type() == infer::MatcherType::Image
    {
        return Some(kind.mime_type().to_string());
    }

    let declared_svg = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(SVG_MIME));
    let head = String::from_utf8_lossy(&response.bytes[..response.bytes.len().min(512)]).to_ascii_lowercase();
    let looks_svg = head.trim_start().starts_with("<svg") || (head.contains("<?xml") && head.contains("<svg"));
    (declared_svg || looks_svg).then(|| SVG_MIME.to_string())
}
