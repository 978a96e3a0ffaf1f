//! Reverse image search by upload.
//!
//! The image is posted as `multipart/form-data` with the fields
//! `rpt=imageview`, `source=collections` and `upfile=<file>`. The search
//! engine answers with a redirect to its results page; the final URL after
//! redirects is what gets opened.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tabdeck_core::TabOpener;
use url::Url;

/// Default upload timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the image search upload.
#[derive(Debug, thiserror::Error)]
pub enum ImageSearchError {
    /// Upload payload is empty or not a recognizable image.
    #[error("not an image: {0}")]
    NotAnImage(String),

    /// Endpoint answered with a non-success status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The results page could not be opened.
    #[error("failed to open results: {0}")]
    Open(String),
}

impl From<reqwest::Error> for ImageSearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ImageSearchError::Timeout } else { ImageSearchError::Network(Arc::new(err)) }
    }
}

impl From<ImageSearchError> for tabdeck_core::Error {
    fn from(err: ImageSearchError) -> Self {
        match err {
            ImageSearchError::NotAnImage(msg) => tabdeck_core::Error::InvalidInput(format!("not an image: {msg}")),
            other => tabdeck_core::Error::ImageSearchFailed(other.to_string()),
        }
    }
}

/// An image to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self { bytes, file_name: file_name.into() }
    }

    /// Sniffed MIME type, if the bytes are an image.
    pub fn mime_type(&self) -> Result<&'static str, ImageSearchError> {
        if self.bytes.is_empty() {
            return Err(ImageSearchError::NotAnImage(format!("{} is empty", self.file_name)));
        }
        match infer::get(&self.bytes) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type()),
            Some(kind) => Err(ImageSearchError::NotAnImage(format!("{} is {}", self.file_name, kind.mime_type()))),
            None => Err(ImageSearchError::NotAnImage(format!("{} has an unknown format", self.file_name))),
        }
    }
}

/// Uploads images to the reverse image search endpoint.
#[derive(Debug, Clone)]
pub struct ImageSearchClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl ImageSearchClient {
    /// Share an existing HTTP client; redirects follow its policy.
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Upload `image` and return the results page URL.
    pub async fn search(&self, image: ImageUpload) -> Result<Url, ImageSearchError> {
        let mime = image.mime_type()?;
        let size = image.bytes.len();

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(mime)
            .map_err(|e| ImageSearchError::NotAnImage(e.to_string()))?;
        let form = Form::new()
            .text("rpt", "imageview")
            .text("source", "collections")
            .part("upfile", part);

        tracing::debug!(endpoint = %self.endpoint, mime, size, "uploading image");

        let response = self
            .http
            .post(self.endpoint.as_str())
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageSearchError::HttpError { status: status.as_u16() });
        }

        let results = response.url().clone();
        tracing::info!(%results, "image search finished");
        Ok(results)
    }

    /// Upload `image` and open the results page in a new tab.
    pub async fn search_and_open(&self, opener: &dyn TabOpener, image: ImageUpload) -> Result<Url, ImageSearchError> {
        let results = self.search(image).await?;
        opener
            .open_tab(results.as_str())
            .await
            .map_err(|e| ImageSearchError::Open(e.to_string()))?;
        Ok(results)
    }
}
