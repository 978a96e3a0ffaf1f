//! Favicon fallback chain.
//!
//! Candidates are tried in a fixed order:
//!
//! - Site-hosted icons: `/favicon.ico`, `/favicon.png`, `/favicon.svg`,
//!   `/apple-touch-icon.png`
//! - The external favicon service, at most once
//! - A single-letter glyph, which cannot fail
//!
//! The chain only moves forward when the current candidate reports a load
//! failure. A candidate that never reports stays current; [`FaviconResolver`]
//! bounds each attempt with a timeout so a stalled load counts as failed.

mod resolver;

use serde::Serialize;
use tabdeck_core::{AppConfig, icon_letter};
use url::Url;

use crate::fetch::{UrlError, hostname};

pub use resolver::{FaviconResolver, ResolvedIcon};

/// Site-relative icon paths, in the order they are tried.
pub const LOCAL_ICON_PATHS: [&str; 4] = ["/favicon.ico", "/favicon.png", "/favicon.svg", "/apple-touch-icon.png"];

/// An external favicon lookup service taking the site URL as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconService {
    base: Url,
    size: u32,
}

impl FaviconService {
    /// Build from a base URL such as `https://www.google.com/s2/favicons`.
    ///
    /// `sz` and `domain_url` are replaced on each lookup; other query
    /// parameters on the base are kept.
    pub fn new(base: &str, size: u32) -> Result<Self, UrlError> {
        let mut base = Url::parse(base).map_err(|e| UrlError::InvalidUrl(format!("{base}: {e}")))?;
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(k, _)| k != "sz" && k != "domain_url")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        base.set_query(None);
        if !kept.is_empty() {
            base.query_pairs_mut().extend_pairs(kept);
        }
        Ok(Self { base, size })
    }

    /// The service URL for `site`.
    pub fn lookup_url(&self, site: &Url) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("sz", &self.size.to_string())
            .append_pair("domain_url", site.as_str());
        url
    }
}

impl TryFrom<&AppConfig> for FaviconService {
    type Error = UrlError;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        Self::new(&config.favicon_service_url, config.favicon_size)
    }
}

/// One step of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum IconCandidate {
    /// An icon hosted by the site itself.
    Local(Url),
    /// The favicon service URL.
    Service(Url),
    /// Terminal text fallback.
    Glyph(String),
}

impl IconCandidate {
    /// The image URL to load, or `None` for the glyph.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Local(url) | Self::Service(url) => Some(url),
            Self::Glyph(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Local(usize),
    Service,
    Glyph,
}

/// Fallback state for one site's icon.
#[derive(Debug, Clone)]
pub struct FaviconChain {
    locals: Vec<Url>,
    service: Url,
    glyph: String,
    step: Step,
    service_attempted: bool,
}

impl FaviconChain {
    /// Start a chain for `site`, labelled with `title` for the glyph.
    pub fn new(site: &Url, title: &str, service: &FaviconService) -> Self {
        let locals: Vec<Url> = LOCAL_ICON_PATHS
            .iter()
            .filter_map(|path| site.join(path).ok())
            .collect();
        let step = if locals.is_empty() { Step::Service } else { Step::Local(0) };
        Self {
            locals,
            service: service.lookup_url(site),
            glyph: glyph_for(title, site),
            step,
            service_attempted: step == Step::Service,
        }
    }

    /// The candidate currently being shown.
    pub fn current(&self) -> IconCandidate {
        match self.step {
            Step::Local(i) => IconCandidate::Local(self.locals[i].clone()),
            Step::Service => IconCandidate::Service(self.service.clone()),
            Step::Glyph => IconCandidate::Glyph(self.glyph.clone()),
        }
    }

    /// Record that the current candidate failed to load and move on.
    ///
    /// Returns the new current candidate. Once the glyph is reached the
    /// chain stays there.
    pub fn on_load_error(&mut self) -> IconCandidate {
        self.step = match self.step {
            Step::Local(i) if i + 1 < self.locals.len() => Step::Local(i + 1),
            Step::Local(_) if !self.service_attempted => {
                self.service_attempted = true;
                Step::Service
            }
            _ => Step::Glyph,
        };
        self.current()
    }

    /// Whether the glyph has been reached.
    pub fn is_terminal(&self) -> bool {
        self.step == Step::Glyph
    }

    /// Every candidate in order, ending with the glyph.
    pub fn candidates(&self) -> Vec<IconCandidate> {
        let mut all: Vec<IconCandidate> = self.locals.iter().cloned().map(IconCandidate::Local).collect();
        all.push(IconCandidate::Service(self.service.clone()));
        all.push(IconCandidate::Glyph(self.glyph.clone()));
        all
    }
}

/// First letter of the title, else of the hostname, else `?`.
pub fn glyph_for(title: &str, site: &Url) -> String {
    let letter = icon_letter(title);
    if !letter.is_empty() {
        return letter;
    }
    let letter = icon_letter(&hostname(site));
    if letter.is_empty() { "?".to_string() } else { letter }
}
