//! In-process fakes for the network and history collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use tabdeck_core::{Error, HistoryIndex, HistoryItem, HistoryQuery, TabOpener, TopSite, TopSitesProvider};
use url::Url;

use crate::fetch::{FetchResponse, PageSource, Probe};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const ICO_BYTES: &[u8] = b"\0\0\x01\0\x01\0\x10\x10";

/// Scripted [`PageSource`] that counts every call.
pub struct FakeSource {
    pub reachable: bool,
    pub html_probe_ok: bool,
    pub page: Option<String>,
    pub images: HashMap<String, Vec<u8>>,
    pub probes: Mutex<Vec<Probe>>,
    pub page_timeouts: Mutex<Vec<Duration>>,
    pub image_requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            html_probe_ok: true,
            page: None,
            images: HashMap::new(),
            probes: Mutex::new(Vec::new()),
            page_timeouts: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self { reachable: false, ..Self::reachable() }
    }

    pub fn with_page(mut self, html: &str) -> Self {
        self.page = Some(html.to_string());
        self
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }

    pub fn page_count(&self) -> usize {
        self.page_timeouts.lock().unwrap().len()
    }

    /// Every probe issued, in order.
    pub fn probes(&self) -> Vec<Probe> {
        self.probes.lock().unwrap().clone()
    }

    /// Timeout passed to each page fetch, in order.
    pub fn page_timeouts(&self) -> Vec<Duration> {
        self.page_timeouts.lock().unwrap().clone()
    }

    pub fn image_requests(&self) -> Vec<String> {
        self.image_requests.lock().unwrap().clone()
    }

    /// Total network calls of any kind.
    pub fn calls(&self) -> usize {
        self.probe_count() + self.page_count() + self.image_requests().len()
    }

    fn response(url: &Url, status: StatusCode, content_type: &str, bytes: Vec<u8>) -> FetchResponse {
        FetchResponse {
            url: url.clone(),
            final_url: url.clone(),
            status,
            content_type: Some(content_type.to_string()),
            bytes: Bytes::from(bytes),
            fetch_ms: 1,
        }
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn probe(&self, url: &Url, probe: &Probe) -> Result<(), Error> {
        self.probes.lock().unwrap().push(probe.clone());
        let ok = if probe.method == Method::HEAD { self.reachable } else { self.reachable && self.html_probe_ok };
        if ok { Ok(()) } else { Err(Error::FetchTimeout(format!("{url}: timed out"))) }
    }

    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, Error> {
        self.page_timeouts.lock().unwrap().push(timeout);
        match &self.page {
            Some(html) => Ok(Self::response(url, StatusCode::OK, "text/html", html.clone().into_bytes())),
            None => Err(Error::HttpError(format!("{url}: network error"))),
        }
    }

    async fn fetch_image(&self, url: &Url, _timeout: Duration) -> Result<FetchResponse, Error> {
        self.image_requests.lock().unwrap().push(url.to_string());
        match self.images.get(url.as_str()) {
            Some(bytes) => Ok(Self::response(url, StatusCode::OK, "application/octet-stream", bytes.clone())),
            None => Err(Error::HttpError(format!("{url}: status 404"))),
        }
    }
}

/// In-memory history index with call counting.
#[derive(Default)]
pub struct FakeHistory {
    pub items: Mutex<Vec<HistoryItem>>,
    pub top: Vec<TopSite>,
    pub fail: bool,
    pub searches: AtomicUsize,
    pub last_query: Mutex<Option<HistoryQuery>>,
}

impl FakeHistory {
    pub fn with_items(items: Vec<HistoryItem>) -> Self {
        Self { items: Mutex::new(items), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HistoryQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryIndex for FakeHistory {
    async fn search(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>, Error> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        if self.fail {
            return Err(Error::InvalidInput("history unavailable".into()));
        }

        let needle = query.text.to_lowercase();
        let mut hits: Vec<HistoryItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| query.start_time.is_none_or(|start| item.last_visit_time >= start))
            .filter(|item| {
                needle.is_empty()
                    || item.url.to_lowercase().contains(&needle)
                    || item.title.as_deref().is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.last_visit_time.cmp(&a.last_visit_time));
        hits.truncate(query.max_results);
        Ok(hits)
    }

    async fn delete_url(&self, url: &str) -> Result<(), Error> {
        self.items.lock().unwrap().retain(|item| item.url != url);
        Ok(())
    }
}

#[async_trait]
impl TopSitesProvider for FakeHistory {
    async fn top_sites(&self) -> Result<Vec<TopSite>, Error> {
        Ok(self.top.clone())
    }
}

/// Records every URL it is asked to open.
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl TabOpener for RecordingOpener {
    async fn open_tab(&self, url: &str) -> Result<(), Error> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
