//! Page fetching for the crawl loop
//!
//! This module defines the fetch-strategy seam used by the crawler:
//! - The [`PageFetcher`] trait: fetch the next page/batch for a cursor
//! - [`Cursor`] / [`RawPage`]: the pagination handshake between crawler
//!   and fetcher
//! - [`RetryPolicy`] and the shared retrying GET helper
//! - [`StaticFetcher`]: plain HTTP GET following next-page links
//!
//! The browser and API strategies live in sibling modules and implement the
//! same trait; the crawler never knows which one it is driving.

use crate::config::HttpConfig;
use crate::crawler::api::ApiMessage;
use crate::crawler::extractor::find_next_page;
use crate::input::ThreadInput;
use crate::{PulseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Pagination position within one thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Thread entry, before anything has been fetched
    Start,

    /// Absolute URL of the next page (page-oriented strategies)
    PageUrl(String),

    /// Offset of the next batch (API strategy)
    Offset(u64),
}

/// Content of one fetched page or batch
#[derive(Debug, Clone)]
pub enum PageContent {
    /// A full HTML document
    Html(String),

    /// One batch of raw API messages
    Batch(Vec<ApiMessage>),
}

/// One fetched page/batch plus where to go next
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The concrete page or request URL this content came from
    pub page_url: String,

    /// The fetched content
    pub content: PageContent,

    /// Cursor for the following page/batch, when one is known
    pub next: Option<Cursor>,

    /// Source-reported continuation signal; `next` is only followed when
    /// this is true
    pub has_more: bool,
}

/// A pluggable fetch strategy
///
/// Implementations interpret the cursor, fetch one page or batch, and
/// report how to continue. Retry behavior is internal to the fetcher; a
/// returned error means the page is gone for good this run.
#[async_trait]
pub trait PageFetcher: Send {
    async fn fetch_next(&mut self, thread: &ThreadInput, cursor: &Cursor) -> Result<RawPage>;

    /// Releases external resources the strategy holds; called once after
    /// the last thread. The default is a no-op.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Bounded retry with exponential backoff
///
/// Applies to transient failures only: timeouts, connect errors, HTTP 429
/// and 5xx. Anything else fails immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first try
    pub max_attempts: u32,

    /// Delay before the first retry; doubled for each retry after that
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Backoff before the retry following failed attempt `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Builds the HTTP client shared by all network fetchers
///
/// # Arguments
///
/// * `config` - The `[http]` section of the configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GETs a URL, retrying transient failures per the policy
///
/// # Retry classification
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Success |
/// | HTTP 429 / 5xx | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Connect error | Retry with backoff |
/// | Other 4xx | Immediate failure |
/// | Other request error | Immediate failure |
///
/// Exhausting the budget returns [`PulseError::RetriesExhausted`] carrying
/// the last transient error.
pub async fn get_with_retries(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<reqwest::Response> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let transient = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let code = status.as_u16();
                if code == 429 || status.is_server_error() {
                    format!("HTTP {}", code)
                } else {
                    return Err(PulseError::HttpStatus {
                        url: url.to_string(),
                        status: code,
                    });
                }
            }
            Err(e) if e.is_timeout() => format!("timeout: {}", e),
            Err(e) if e.is_connect() => format!("connect error: {}", e),
            Err(e) => {
                return Err(PulseError::Http {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        if attempt >= policy.max_attempts {
            return Err(PulseError::RetriesExhausted {
                url: url.to_string(),
                attempts: attempt,
                last_error: transient,
            });
        }

        let backoff = policy.backoff_for(attempt);
        tracing::debug!(
            "Transient failure for {} (attempt {}/{}): {}; retrying in {:?}",
            url,
            attempt,
            policy.max_attempts,
            transient,
            backoff
        );
        tokio::time::sleep(backoff).await;
    }
}

/// Plain-HTTP fetch strategy
///
/// GETs each page directly and paginates by following the next-page link
/// discovered in the returned HTML. Works for server-rendered forums; pages
/// that only populate via script need the browser strategy.
pub struct StaticFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl StaticFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_next(&mut self, thread: &ThreadInput, cursor: &Cursor) -> Result<RawPage> {
        let url = match cursor {
            Cursor::PageUrl(next) => next.clone(),
            // Anything else restarts from the thread entry
            _ => thread.url.clone(),
        };

        let response = get_with_retries(&self.client, &url, &self.policy).await?;
        let body = response.text().await.map_err(|e| PulseError::Http {
            url: url.clone(),
            source: e,
        })?;

        let next = find_next_page(&body, &url);

        Ok(RawPage {
            page_url: url,
            content: PageContent::Html(body),
            has_more: next.is_some(),
            next: next.map(Cursor::PageUrl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let config = HttpConfig::default();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(500),
        };

        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_policy_from_config() {
        let config = HttpConfig::default();
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
    }

    // HTTP behavior (retry exhaustion, status classification) is covered
    // with a mock server in the integration tests.
}
