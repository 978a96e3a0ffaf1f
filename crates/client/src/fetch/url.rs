//! User-entered URL normalization.

use url::Url;

/// Error type for URL formatting failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL or domain name: {0}")]
    InvalidUrl(String),

    #[error("invalid domain format: {0}")]
    InvalidDomain(String),
}

impl From<UrlError> for tabdeck_core::Error {
    fn from(err: UrlError) -> Self {
        tabdeck_core::Error::InvalidUrl(err.to_string())
    }
}

/// Turn user input into an absolute URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to `https://` when missing (`//host` gets `https:`)
/// 3. Parse per the WHATWG URL standard, which lowercases scheme and host
///    and adds a root path
/// 4. Require an http(s) scheme and a dotted hostname
pub fn format_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    match parsed.host_str() {
        Some(host) if host.contains('.') => Ok(parsed),
        _ => Err(UrlError::InvalidDomain(trimmed.to_string())),
    }
}

/// Hostname used as a last-resort title.
pub fn hostname(url: &Url) -> String {
    url.host_str().unwrap_or_else(|| url.as_str()).to_string()
}
