//! HTTP fetch client with bounded timeouts and request tracking
//!
//! Every response is returned as data, including 4xx/5xx statuses; only
//! transport-level failures (DNS, connect, timeout) surface as errors.
//! Callers decide what a given status means.

use crate::error::Result;
use crate::models::ScanConfig;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Options for a single fetch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub timeout: Duration,
    pub extra_headers: Vec<(String, String)>,
    pub follow_redirects: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            timeout: Duration::from_secs(10),
            extra_headers: Vec::new(),
            follow_redirects: true,
        }
    }
}

/// One observed HTTP response. Produced fresh per request and never shared
/// or cached across checks.
#[derive(Debug)]
pub struct FetchResult {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed: Duration,
}

impl FetchResult {
    /// Case-insensitive single-header lookup as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values for a repeatable header (e.g. Set-Cookie)
    pub fn header_all(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok().map(String::from))
            .collect()
    }
}

/// HTTP client shared by all checks. Holds no cookie jar, cache, or other
/// cross-request state the checks could observe each other through.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    no_redirect_client: Client,
    page_timeout: Duration,
    head_timeout: Duration,
    request_count: Arc<AtomicU64>,
}

impl Fetcher {
    /// Builds a fetcher from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        // Redirect policy is per-client in reqwest, so the open-redirect
        // probe gets its own non-following client.
        let no_redirect_client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            no_redirect_client,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            head_timeout: Duration::from_secs(config.head_timeout_secs),
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// GET with the full-page timeout
    pub async fn get_page(&self, url: &str) -> Result<FetchResult> {
        self.fetch(
            url,
            FetchOptions {
                timeout: self.page_timeout,
                ..FetchOptions::default()
            },
        )
        .await
    }

    /// HEAD with the shorter metadata timeout
    pub async fn head(&self, url: &str) -> Result<FetchResult> {
        self.fetch(
            url,
            FetchOptions {
                method: Method::HEAD,
                timeout: self.head_timeout,
                ..FetchOptions::default()
            },
        )
        .await
    }

    /// GET with the metadata timeout, for single active probes
    pub async fn get_probe(&self, url: &str) -> Result<FetchResult> {
        self.fetch(
            url,
            FetchOptions {
                timeout: self.head_timeout,
                ..FetchOptions::default()
            },
        )
        .await
    }

    /// Issues a request with explicit options
    pub async fn fetch(&self, url: &str, opts: FetchOptions) -> Result<FetchResult> {
        let client = if opts.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        };

        self.request_count.fetch_add(1, Ordering::Relaxed);

        let mut req = client
            .request(opts.method.clone(), url)
            .timeout(opts.timeout);
        for (key, value) in &opts.extra_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        let elapsed = started.elapsed();

        debug!("{} {url} -> {status} in {elapsed:?}", opts.method);

        Ok(FetchResult {
            status,
            headers,
            body,
            elapsed,
        })
    }

    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }

    pub fn head_timeout(&self) -> Duration {
        self.head_timeout
    }

    /// Total requests issued through this fetcher
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}
