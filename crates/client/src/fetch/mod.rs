//! HTTP fetch pipeline.
//!
//! ### URL Resolution
//! - Paths resolve against the app scope; absolute URLs pass through
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Fetcher seam
//! - The cache controller only sees the [`Fetcher`] trait, so tests swap in
//!   an in-memory network.
//! - Any HTTP status is a successful fetch; only transport failures,
//!   timeouts and oversize bodies are errors.

pub mod url;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};
pub use reqwest::{Method, StatusCode};

use momentum_core::{AppConfig, Error, StoredResponse};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "momentum/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "momentum/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: None }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
    /// Time taken to fetch in milliseconds (0 when replayed from cache)
    pub fetch_ms: u64,
}

impl FetchResponse {
    pub fn new(url: Url, status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { url, status, headers: HeaderMap::new(), body: body.into(), fetch_ms: 0 }
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Snapshot keyed by the request's identity, not the post-redirect URL.
    pub fn to_stored(&self, request: &Request) -> StoredResponse {
        let mut stored = StoredResponse::new(request.method.as_str(), request.url.as_str(), self.status.as_u16(), self.body.to_vec());
        stored.status_text = self.status.canonical_reason().map(str::to_string);
        stored.headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        stored
    }

    /// Rebuild a response from a snapshot. Headers that no longer parse are dropped.
    pub fn from_stored(stored: &StoredResponse) -> Result<Self, Error> {
        let url = Url::parse(&stored.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", stored.url)))?;
        let status = StatusCode::from_u16(stored.status)
            .map_err(|e| Error::InvalidInput(format!("stored status {}: {e}", stored.status)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &stored.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                headers.append(name, value);
            }
        }

        Ok(Self { url, status, headers, body: Bytes::from(stored.body.clone()), fetch_ms: 0 })
    }
}

/// The network, as seen by the cache controller.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one request. Non-2xx statuses are `Ok`.
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error>;
}

/// reqwest-backed [`Fetcher`].
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::Network(format!("{url}: {err}"))
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| transport_error(&request.url, e))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        let body = response.bytes().await.map_err(|e| transport_error(&request.url, e))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} {} in {}ms ({} bytes)",
            request.method,
            request.url,
            url,
            status.as_u16(),
            fetch_ms,
            body.len()
        );

        Ok(FetchResponse { url, status, headers, body, fetch_ms })
    }
}
