//! Thread crawling
//!
//! Everything between a thread URL and its extracted posts:
//! - `fetcher`: the [`PageFetcher`] strategy seam, retry policy, and the
//!   plain-HTTP strategy
//! - `browser`: the rendered-page strategy (headless Chrome + scrolling)
//! - `api`: the offset-paginated JSON strategy
//! - `extractor`: post extraction and next-link discovery
//! - `thread_crawler`: the per-thread loop with budgets and dedup

pub mod api;
pub mod browser;
pub mod extractor;
pub mod fetcher;
pub mod thread_crawler;

pub use api::{parse_section_id, ApiFetcher, ApiMessage};
pub use browser::BrowserFetcher;
pub use extractor::{clean_text, extract_posts, find_next_page, Post, PostKey};
pub use fetcher::{
    build_http_client, get_with_retries, Cursor, PageContent, PageFetcher, RawPage, RetryPolicy,
    StaticFetcher,
};
pub use thread_crawler::{ThreadCrawl, ThreadCrawler};

use crate::config::{Config, FetchStrategy};
use crate::render::ChromiumEngine;
use crate::Result;

/// Builds the fetch strategy the configuration asks for
///
/// The browser strategy's engine launches lazily, so constructing it here
/// does not start Chrome; nothing touches the network until the first
/// fetch.
pub fn build_fetcher(config: &Config) -> Result<Box<dyn PageFetcher>> {
    let policy = RetryPolicy::from_config(&config.http);

    Ok(match config.fetch.strategy {
        FetchStrategy::Static => {
            let client = build_http_client(&config.http)?;
            Box::new(StaticFetcher::new(client, policy))
        }
        FetchStrategy::Api => {
            let client = build_http_client(&config.http)?;
            Box::new(ApiFetcher::new(client, policy, config.api.clone()))
        }
        FetchStrategy::Browser => {
            let engine = ChromiumEngine::new(config.browser.clone());
            Box::new(BrowserFetcher::new(engine, config.browser.clone()))
        }
    })
}
