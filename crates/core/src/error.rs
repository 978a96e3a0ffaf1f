//! Unified error types for tabdeck.
//!
//! Only `InvalidUrl` and `Unreachable` ever leave a metadata resolution;
//! the fetch/extract variants are produced by the pipeline's inner stages
//! and absorbed into the hostname fallback before reaching callers.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the tabdeck service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Malformed URL or domain, rejected before any I/O.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The reachability probe failed; the site could not be contacted.
    #[error("UNREACHABLE: {0}")]
    Unreachable(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network or HTTP level failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The page had neither a `<title>` nor an `og:title`.
    #[error("TITLE_NOT_FOUND: {0}")]
    TitleNotFound(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be encoded or decoded.
    #[error("STORE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// The favorites list is at capacity.
    #[error("FAVORITES_FULL: limit of {0} favorites reached")]
    FavoritesFull(usize),

    /// No favorite with the given id.
    #[error("FAVORITE_NOT_FOUND: {0}")]
    FavoriteNotFound(i64),

    /// Reverse image search upload failed.
    #[error("IMAGE_SEARCH_FAILED: {0}")]
    ImageSearchFailed(String),
}

impl Error {
    /// Whether this error came out of the network stage of a fetch.
    ///
    /// Timeouts and transport failures are deliberately not told apart.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::FetchTimeout(_) | Error::FetchTooLarge(_) | Error::HttpError(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Unreachable(msg) => (-32004, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::TitleNotFound(msg) => (-32000, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Serialization(msg) => (-32002, msg.clone()),
            Error::FavoritesFull(limit) => (-32010, format!("favorites limit of {limit} reached")),
            Error::FavoriteNotFound(id) => (-32011, format!("no favorite with id {id}")),
            Error::ImageSearchFailed(msg) => (-32012, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unreachable("example.com".to_string());
        assert!(err.to_string().contains("UNREACHABLE"));
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidUrl("not a domain".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32003);

        let mcp_err: McpError = Error::FavoritesFull(15).into();
        assert_eq!(mcp_err.code.0, -32010);
        assert!(mcp_err.message.contains("15"));
    }

    #[test]
    fn test_fetch_failures_grouped() {
        assert!(Error::FetchTimeout("t".into()).is_fetch_failure());
        assert!(Error::HttpError("h".into()).is_fetch_failure());
        assert!(!Error::Unreachable("u".into()).is_fetch_failure());
        assert!(!Error::TitleNotFound("x".into()).is_fetch_failure());
    }

    #[test]
    fn test_from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
