//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the shared HTTP client with browser-like headers
//! - GET requests with optional query parameters
//! - Retry with exponential backoff on any failure
//! - Reporting failures as an explicit result instead of an empty body

use crate::config::RetryConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Browser-like user agent sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/119.0 Safari/537.36";

/// Accept-Language header sent with every request
pub const ACCEPT_LANGUAGE_VALUE: &str = "de,en;q=0.8";

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection, timeout or body read error
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status of 400 or above
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The server answered successfully but sent nothing
    #[error("empty response body")]
    EmptyBody,
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Successfully fetched a non-empty page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Every attempt failed, or the page was empty
    Failed {
        /// Reason of the last failed attempt
        reason: FetchFailure,
        /// Number of attempts made
        attempts: u32,
    },
}

impl FetchResult {
    /// Returns the page body on success
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failed { .. } => None,
        }
    }

    /// Returns true if the page was fetched
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A single successful HTTP exchange
#[derive(Debug, Clone)]
pub struct Page {
    pub final_url: String,
    pub status_code: u16,
    pub body: String,
}

/// Source of HTML pages for the crawl coordinator
///
/// The production implementation is [`HttpFetcher`]; tests substitute
/// in-memory sources.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetches one page, already retried as the source sees fit
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// The client carries a browser-like user agent, `Accept-Language: de,en;q=0.8`
/// and the per-request timeout from the retry policy. It is built once per run
/// and reused for every request.
///
/// # Example
///
/// ```no_run
/// use wlw_scraper::config::RetryConfig;
/// use wlw_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&RetryConfig::default()).unwrap();
/// ```
pub fn build_http_client(retry: &RetryConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(seconds(retry.timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Delay before retry `attempt` (0-indexed): `backoff_factor * 2^attempt` seconds
pub fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    seconds(retry.backoff_factor * 2f64.powi(exponent))
}

/// Converts seconds to a Duration, saturating at `Duration::MAX`
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    }
}

/// Runs `attempt` up to `retries + 1` times with exponential backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Network error | Retry after backoff |
/// | HTTP status >= 400 | Warn, retry after backoff |
/// | Empty body | Immediate → Failed(EmptyBody) |
/// | Retries exhausted | Failed with the last reason |
///
/// There is no jitter: the delay before retry `i` is exactly
/// [`backoff_delay`]`(retry, i)`.
pub async fn retry_with_backoff<F, Fut>(retry: &RetryConfig, url: &str, mut attempt: F) -> FetchResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Page, FetchFailure>>,
{
    let total = retry.retries.saturating_add(1);
    let mut last_failure = None;

    for i in 0..total {
        match attempt().await {
            Ok(page) if page.body.is_empty() => {
                tracing::warn!("Empty response body for {}", url);
                return FetchResult::Failed {
                    reason: FetchFailure::EmptyBody,
                    attempts: i + 1,
                };
            }
            Ok(page) => {
                return FetchResult::Success {
                    final_url: page.final_url,
                    status_code: page.status_code,
                    body: page.body,
                };
            }
            Err(failure) => {
                tracing::warn!(
                    "Request error (attempt {}/{}) for {}: {}",
                    i + 1,
                    total,
                    url,
                    failure
                );
                last_failure = Some(failure);

                if i + 1 < total {
                    tokio::time::sleep(backoff_delay(retry, i)).await;
                }
            }
        }
    }

    tracing::error!("Failed to fetch {} after {} attempts", url, total);
    if let Some(failure) = &last_failure {
        tracing::debug!("Last error: {}", failure);
    }

    FetchResult::Failed {
        reason: last_failure.unwrap_or_else(|| FetchFailure::Network("no attempt made".to_string())),
        attempts: total,
    }
}

/// HTTP page source: one shared client plus the retry policy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Builds the client and wraps it with the retry policy
    pub fn new(retry: RetryConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&retry)?;
        Ok(Self { client, retry })
    }

    /// Fetches a URL with query parameters, retrying per the policy
    pub async fn fetch_with_params(&self, url: &str, params: &[(&str, &str)]) -> FetchResult {
        retry_with_backoff(&self.retry, url, || fetch_once(&self.client, url, params)).await
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with_params(url, &[]).await
    }
}

/// Performs a single GET request
async fn fetch_once(client: &Client, url: &str, params: &[(&str, &str)]) -> Result<Page, FetchFailure> {
    let mut request = client.get(url);
    if !params.is_empty() {
        request = request.query(params);
    }

    let response = request.send().await.map_err(classify_error)?;
    let status = response.status();

    if status.as_u16() >= 400 {
        tracing::warn!(
            "Got status code {} for {} with params {:?}",
            status.as_u16(),
            url,
            params
        );
        return Err(FetchFailure::HttpStatus(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(classify_error)?;

    Ok(Page {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Network("Request timeout".to_string())
    } else if e.is_connect() {
        FetchFailure::Network(format!("Connection failed: {}", e))
    } else {
        FetchFailure::Network(e.to_string())
    }
}
