//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from the transport configuration
//! - GET requests with custom headers and a rotating user agent
//! - Body size capping
//! - Lightweight HEAD probes used to pick a scheme for bare seeds
//! - Error classification

use crate::config::HttpConfig;
use crate::{ConfigError, WraithError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client, Proxy, Response};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed when redirects are enabled
pub const MAX_REDIRECTS: usize = 10;

/// Browser user agents, one picked at random per request
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:54.0) Gecko/20100101 Firefox/54.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:80.0) Gecko/20100101 Firefox/80.0",
];

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct PageFetch {
    /// Final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value (empty when absent)
    pub content_type: String,
    /// Page body, possibly truncated to the size cap
    pub body: String,
}

impl PageFetch {
    /// Returns true if the response declares an HTML content type
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("html")
    }

    /// Returns true if the page path names a JavaScript file
    pub fn is_javascript(&self) -> bool {
        self.url.path().ends_with(".js")
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success(PageFetch),

    /// Non-2xx response, including unfollowed redirects
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, TLS, body read)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// The transport a crawl session fetches pages through
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page
    async fn fetch(&self, url: &Url) -> FetchResult;

    /// Returns true if the URL answers with any HTTP response at all
    async fn probe(&self, url: &Url) -> bool;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP transport configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. bad proxy URL)
///
/// # Example
///
/// ```no_run
/// use wraith::config::HttpConfig;
/// use wraith::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let redirect = if config.disable_redirects {
        Policy::none()
    } else {
        Policy::limited(MAX_REDIRECTS)
    };

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .danger_accept_invalid_certs(config.insecure)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Converts configured headers into a header map
fn build_header_map(config: &HttpConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::MalformedHeader(format!("invalid header name '{}'", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::MalformedHeader(format!("invalid value for header '{}'", name))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
    headers: HeaderMap,
    body_limit: Option<usize>,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP transport configuration
    pub fn new(config: &HttpConfig) -> Result<Self, WraithError> {
        let client = build_http_client(config)?;
        let headers = build_header_map(config)?;

        Ok(Self {
            client,
            headers,
            body_limit: config.body_limit(),
        })
    }

    /// The underlying client, shared with the archive lookup
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn user_agent(&self) -> &'static str {
        USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL, classifying failures
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | Success (body capped at the size limit) |
    /// | 3xx with redirects disabled | HttpError |
    /// | other non-2xx | HttpError |
    /// | Timeout / connect / TLS / body read | NetworkError |
    async fn fetch(&self, url: &Url) -> FetchResult {
        let request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.user_agent())
            .headers(self.headers.clone());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match read_body(response, self.body_limit).await {
            Ok((body, truncated)) => {
                if truncated {
                    tracing::debug!("Truncated body of {} at {} bytes", final_url, body.len());
                }
                FetchResult::Success(PageFetch {
                    url: final_url,
                    status_code: status.as_u16(),
                    content_type,
                    body: String::from_utf8_lossy(&body).into_owned(),
                })
            }
            Err(e) => FetchResult::NetworkError {
                error: e.to_string(),
            },
        }
    }

    async fn probe(&self, url: &Url) -> bool {
        let result = self
            .client
            .head(url.clone())
            .header(USER_AGENT, self.user_agent())
            .send()
            .await;

        match result {
            Ok(response) => {
                tracing::debug!("Probe {} answered {}", url, response.status());
                true
            }
            Err(e) => {
                tracing::debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Reads a response body, stopping at `limit` bytes
///
/// Returns the retained bytes and whether anything was cut off.
async fn read_body(
    mut response: Response,
    limit: Option<usize>,
) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);

        if let Some(limit) = limit {
            if body.len() >= limit {
                let truncated = body.len() > limit || response.chunk().await?.is_some();
                body.truncate(limit);
                return Ok((body, truncated));
            }
        }
    }

    Ok((body, false))
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}
