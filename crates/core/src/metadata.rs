//! Site metadata produced by the resolution pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a resolved title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    /// A prior visit recorded in browser history.
    History,
    /// The page's `<title>` or `og:title`.
    Fetch,
    /// The URL's hostname, used when the site is reachable but untitled.
    Hostname,
}

impl MetadataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Fetch => "fetch",
            Self::Hostname => "hostname",
        }
    }
}

/// Best-effort page metadata. `title` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub title: String,
    pub source: MetadataSource,
}

impl Metadata {
    pub fn new(title: impl Into<String>, source: MetadataSource) -> Self {
        Self { title: title.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        let meta = Metadata::new("Example", MetadataSource::Fetch);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["source"], "fetch");
        assert_eq!(json["title"], "Example");
    }

    #[test]
    fn test_source_as_str_matches_serde() {
        for source in [MetadataSource::History, MetadataSource::Fetch, MetadataSource::Hostname] {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, source.as_str());
        }
    }
}
