//! Per-thread crawl loop
//!
//! Drives one fetch strategy across a thread's pages, extracting and
//! deduplicating posts until a termination condition hits:
//! - the page budget (`max-pages`)
//! - the accepted-post budget (`max-messages`)
//! - the source reporting no more pages
//! - too many consecutive pages contributing nothing new, which guards
//!   against sources that claim "more" forever
//!
//! A fetch error on the very first page fails the thread; a fetch error
//! later ends paging but keeps what was collected, recorded as a
//! truncation rather than a failure.

use crate::config::{ExtractConfig, FetchConfig};
use crate::crawler::extractor::{extract_posts, Post, PostKey};
use crate::crawler::fetcher::{Cursor, PageFetcher};
use crate::input::ThreadInput;
use crate::Result;
use std::collections::HashSet;
use std::time::Duration;

/// Outcome of one thread's crawl
#[derive(Debug)]
pub struct ThreadCrawl {
    /// Accepted posts in source order, unique by dedup key
    pub posts: Vec<Post>,

    /// Pages or batches fetched
    pub pages_fetched: u32,

    /// Set when a mid-crawl fetch failure ended paging early
    pub truncation: Option<String>,
}

/// Strategy-agnostic crawl loop with budgets and dedup
pub struct ThreadCrawler {
    fetch: FetchConfig,
    extract: ExtractConfig,
}

impl ThreadCrawler {
    pub fn new(fetch: FetchConfig, extract: ExtractConfig) -> Self {
        Self { fetch, extract }
    }

    /// Crawls one thread to completion
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetch strategy to drive
    /// * `thread` - The thread to crawl
    ///
    /// # Returns
    ///
    /// * `Ok(ThreadCrawl)` - Posts collected, possibly truncated
    /// * `Err(PulseError)` - The first page could not be fetched at all
    pub async fn crawl(
        &self,
        fetcher: &mut dyn PageFetcher,
        thread: &ThreadInput,
    ) -> Result<ThreadCrawl> {
        let mut posts: Vec<Post> = Vec::new();
        let mut seen: HashSet<PostKey> = HashSet::new();
        let mut cursor = Cursor::Start;
        let mut pages_fetched = 0u32;
        let mut empty_streak = 0u32;
        let mut truncation = None;

        loop {
            if self.fetch.max_pages > 0 && pages_fetched >= self.fetch.max_pages {
                tracing::debug!("Page budget ({}) reached for {}", self.fetch.max_pages, thread.url);
                break;
            }

            // Politeness pause between pages, never before the first
            if pages_fetched > 0 && self.fetch.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.fetch.delay_ms)).await;
            }

            let page = match fetcher.fetch_next(thread, &cursor).await {
                Ok(page) => page,
                Err(e) if pages_fetched == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Fetch failed on page {} of {}: {}; keeping {} posts collected so far",
                        pages_fetched + 1,
                        thread.url,
                        e,
                        posts.len()
                    );
                    truncation = Some(format!("fetch failed on page {}: {}", pages_fetched + 1, e));
                    break;
                }
            };
            pages_fetched += 1;

            let extracted = extract_posts(&page, &self.extract);
            let mut accepted = 0usize;
            for post in extracted {
                if self.message_budget_hit(posts.len()) {
                    break;
                }
                if seen.insert(post.dedup_key()) {
                    posts.push(post);
                    accepted += 1;
                }
            }

            tracing::debug!(
                "Page {} of {}: accepted {} new posts ({} total)",
                pages_fetched,
                thread.url,
                accepted,
                posts.len()
            );

            if accepted == 0 {
                empty_streak += 1;
            } else {
                empty_streak = 0;
            }

            if self.message_budget_hit(posts.len()) {
                tracing::debug!(
                    "Message budget ({}) reached for {}",
                    self.fetch.max_messages,
                    thread.url
                );
                break;
            }

            if empty_streak >= self.fetch.max_empty_pages {
                tracing::debug!(
                    "{} consecutive pages with nothing new on {}; treating thread as exhausted",
                    empty_streak,
                    thread.url
                );
                break;
            }

            cursor = match page.next {
                Some(next) if page.has_more => next,
                _ => break,
            };
        }

        Ok(ThreadCrawl {
            posts,
            pages_fetched,
            truncation,
        })
    }

    fn message_budget_hit(&self, collected: usize) -> bool {
        self.fetch.max_messages > 0 && collected as u32 >= self.fetch.max_messages
    }
}
