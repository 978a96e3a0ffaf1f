//! Bounded HTTP fetching for probes, pages and icons.
//!
//! ### Probes
//! - A probe only tests reachability: any HTTP response, whatever its
//!   status, counts as success, and the body is never read.
//! - Each probe carries its own timeout; a timeout is reported like any
//!   other network failure.
//!
//! ### Page and icon fetches
//! - Per-request timeout covering headers and body.
//! - Bodies are read incrementally up to `max_bytes`. Pages keep the
//!   prefix read so far, since the title sits near the top; images past
//!   the limit are rejected.
//! - Max redirects: 5

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, Method, StatusCode, header};
use tabdeck_core::Error;

pub use self::url::{UrlError, format_url, hostname};
pub use ::url::Url;

const NAVIGATE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "tabdeck/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "tabdeck/0.1".to_string(), max_bytes: 5 * 1024 * 1024, max_redirects: 5 }
    }
}

/// A reachability probe: method, deadline and optional `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub method: Method,
    pub timeout: Duration,
    pub accept: Option<&'static str>,
}

impl Probe {
    /// HEAD probe with no content negotiation.
    pub fn head(timeout: Duration) -> Self {
        Self { method: Method::HEAD, timeout, accept: None }
    }

    /// GET probe asking for HTML; the body is discarded unread.
    pub fn html(timeout: Duration) -> Self {
        Self { method: Method::GET, timeout, accept: Some("text/html") }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Network operations the resolution pipeline depends on.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Check that `url` answers at all, within the probe's deadline.
    async fn probe(&self, url: &Url, probe: &Probe) -> Result<(), Error>;

    /// Fetch a document the way a browser navigation would. The status is
    /// not checked.
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, Error>;

    /// Fetch an image. Non-success statuses are errors.
    async fn fetch_image(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, Error>;
}

fn request_error(url: &Url, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: timed out"))
    } else {
        Error::HttpError(format!("{url}: network error: {err}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Page,
    Image,
}

/// reqwest-backed [`PageSource`].
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// The underlying HTTP client, shared with other request builders.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn get(&self, url: &Url, timeout: Duration, kind: Kind) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.get(url.as_str()).timeout(timeout);
        request = match kind {
            Kind::Page => request
                .header(header::ACCEPT, NAVIGATE_ACCEPT)
                .header("Sec-Fetch-Dest", "document")
                .header("Sec-Fetch-Mode", "navigate"),
            Kind::Image => request.header(header::ACCEPT, IMAGE_ACCEPT),
        };

        let mut response = request.send().await.map_err(|e| request_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let max = self.config.max_bytes;
        if kind == Kind::Image
            && let Some(len) = response.content_length()
            && len as usize > max
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {max}")));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, &e))? {
            if body.len() + chunk.len() > max {
                if kind == Kind::Image {
                    return Err(Error::FetchTooLarge(format!("body exceeds {max} bytes")));
                }
                body.extend_from_slice(&chunk[..max - body.len()]);
                tracing::debug!(%url, max, "page truncated at size limit");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, body.len());

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes: body.freeze(), fetch_ms })
    }
}

#[async_trait]
impl PageSource for FetchClient {
    async fn probe(&self, url: &Url, probe: &Probe) -> Result<(), Error> {
        let mut request = self.http.request(probe.method.clone(), url.as_str()).timeout(probe.timeout);
        if let Some(accept) = probe.accept {
            request = request.header(header::ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| request_error(url, &e))?;
        tracing::debug!(%url, method = %probe.method, status = response.status().as_u16(), "probe answered");
        Ok(())
    }

    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, Error> {
        self.get(url, timeout, Kind::Page).await
    }

    async fn fetch_image(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, Error> {
        let response = self.get(url, timeout, Kind::Image).await?;
        if !response.status.is_success() {
            return Err(Error::HttpError(format!("{url}: status {}", response.status.as_u16())));
        }
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Loopback HTTP responder for exercising the real client.

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request_complete(seen: &[u8]) -> bool {
        let Some(end) = seen.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&seen[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        seen.len() >= end + 4 + body_len
    }

    /// Request heads received by [`serve_recording`], lowercased.
    pub type Requests = Arc<Mutex<Vec<String>>>;

    /// Serve `response` verbatim to every connection, after reading the
    /// request head and any `Content-Length` body.
    pub async fn serve(response: &'static str) -> SocketAddr {
        serve_recording(response).await.0
    }

    /// Like [`serve`], also keeping each request head.
    pub async fn serve_recording(response: &'static str) -> (SocketAddr, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Requests::default();
        let seen_requests = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                let seen_requests = seen_requests.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut seen = Vec::new();
                    while !request_complete(&seen) {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => seen.extend_from_slice(&buf[..n]),
                        }
                    }
                    let end = seen.windows(4).position(|w| w == b"\r\n\r\n").unwrap_or(seen.len());
                    let head = String::from_utf8_lossy(&seen[..end]).to_ascii_lowercase();
                    seen_requests.lock().unwrap().push(head);
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        (addr, requests)
    }

    /// Accept connections and never answer.
    pub async fn serve_silent() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        addr
    }

    /// An address with nothing listening on it.
    pub async fn closed_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }
}
