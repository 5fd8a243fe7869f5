//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent, headers and timeout
//! - GET requests to fetch page content
//! - Error classification

use crate::config::RequestConfig;
use crate::{ConfigError, FetchError, SieveError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one fetch
const MAX_REDIRECTS: usize = 10;

/// A fetched HTTP response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub final_url: Url,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Page body; empty for non-2xx responses
    pub body: String,
}

impl FetchedPage {
    /// Whether the fetch was successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the response is HTML
    ///
    /// A response without a Content-Type header is assumed to be HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
            .unwrap_or(true)
    }
}

/// Trait for page fetchers
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, following redirects
    ///
    /// Non-2xx responses are returned as pages; only transport failures are
    /// errors.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The request configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(SieveError)` - A configured header is invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use topic_sieve::config::RequestConfig;
/// use topic_sieve::crawler::build_http_client;
///
/// let client = build_http_client(&RequestConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RequestConfig) -> Result<Client, SieveError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::Validation(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid value for header '{}': {}", name, e))
        })?;
        headers.insert(name, value);
    }

    let timeout = config.timeout();
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the request configuration
    pub fn new(config: &RequestConfig) -> Result<Self, SieveError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = if status.is_success() {
            response.text().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?
        } else {
            String::new()
        };

        Ok(FetchedPage {
            status: status.as_u16(),
            final_url,
            content_type,
            body,
        })
    }
}

/// Maps a reqwest error onto the crawler's fetch error kinds
fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
