use std::time::Duration;

use tabdeck_core::{Error, Metadata, MetadataSource};
use url::Url;

use crate::extract::extract_title;
use crate::fetch::{PageSource, Probe};

/// Fetch `url` as a document and read its title.
///
/// A GET probe asking for HTML runs first; if it fails the page is never
/// requested. The page's HTTP status is ignored, so error pages with a
/// `<title>` still produce one.
pub async fn fetch_title(source: &dyn PageSource, url: &Url, timeout: Duration) -> Result<Metadata, Error> {
    source.probe(url, &Probe::html(timeout)).await?;

    let response = source.fetch_page(url, timeout).await?;
    tracing::debug!(%url, status = response.status.as_u16(), bytes = response.bytes.len(), "page fetched for title");

    extract_title(&response.text())
        .map(|title| Metadata::new(title, MetadataSource::Fetch))
        .ok_or_else(|| Error::TitleNotFound(url.to_string()))
}
