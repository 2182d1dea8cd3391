//! Rendered-page fetch strategy
//!
//! Drives a [`RenderEngine`] to handle forums that populate posts with
//! script: load the page, wait for post markup, scroll until no more
//! content loads, then hand the rendered HTML to the extractor. Classic
//! next-page links still work, discovered on the rendered document the
//! same way the static strategy does it.

use crate::config::BrowserConfig;
use crate::crawler::extractor::find_next_page;
use crate::crawler::fetcher::{Cursor, PageContent, PageFetcher, RawPage};
use crate::input::ThreadInput;
use crate::render::RenderEngine;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub struct BrowserFetcher<E: RenderEngine> {
    engine: E,
    settings: BrowserConfig,
}

impl<E: RenderEngine> BrowserFetcher<E> {
    pub fn new(engine: E, settings: BrowserConfig) -> Self {
        Self { engine, settings }
    }

    /// Scrolls to the bottom repeatedly to trigger lazy-loaded posts
    ///
    /// Progress is growth of the post-element count. A round with no new
    /// elements and no height change counts against `scroll_max`
    /// consecutive stalls; `scroll_limit` caps total rounds regardless.
    async fn scroll_to_load_more(&mut self) -> Result<()> {
        let selector = self.settings.post_selector.clone();
        let pause = Duration::from_millis(self.settings.scroll_pause_ms);

        let mut stalled = 0u32;
        let mut rounds = 0u32;
        let mut last_height = self.engine.content_height().await?;
        let mut last_count = self.engine.count_elements(&selector).await?;

        while stalled < self.settings.scroll_max && rounds < self.settings.scroll_limit {
            rounds += 1;
            self.engine.scroll_to_bottom().await?;
            tokio::time::sleep(pause).await;

            let count = self.engine.count_elements(&selector).await?;
            let height = self.engine.content_height().await?;

            if count > last_count {
                last_count = count;
                last_height = height;
                stalled = 0;
            } else if height == last_height {
                stalled += 1;
            } else {
                // Height still moving; something may be loading
                last_height = height;
            }
        }

        tracing::debug!(
            "Scroll settled after {} rounds, {} post elements",
            rounds,
            last_count
        );
        Ok(())
    }
}

#[async_trait]
impl<E: RenderEngine> PageFetcher for BrowserFetcher<E> {
    async fn fetch_next(&mut self, thread: &ThreadInput, cursor: &Cursor) -> Result<RawPage> {
        let url = match cursor {
            Cursor::PageUrl(next) => next.clone(),
            _ => thread.url.clone(),
        };

        self.engine.load(&url).await?;

        let wait = Duration::from_secs(self.settings.wait_timeout_secs);
        let ready = self
            .engine
            .wait_for(&self.settings.post_selector, wait)
            .await?;
        if !ready {
            tracing::debug!(
                "Selector '{}' never appeared on {}; proceeding with rendered content",
                self.settings.post_selector,
                url
            );
        }

        self.scroll_to_load_more().await?;
        let html = self.engine.page_html().await?;

        let next = find_next_page(&html, &url);

        Ok(RawPage {
            page_url: url,
            content: PageContent::Html(html),
            has_more: next.is_some(),
            next: next.map(Cursor::PageUrl),
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.engine.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Engine stub scripted with per-round element counts and heights
    #[derive(Default)]
    struct ScriptedEngine {
        initial_count: usize,
        initial_height: f64,
        rounds: VecDeque<(usize, f64)>,
        html: String,
        scrolls: u32,
        loaded: Vec<String>,
        closed: bool,
    }

    #[async_trait]
    impl RenderEngine for ScriptedEngine {
        async fn load(&mut self, url: &str) -> Result<()> {
            self.loaded.push(url.to_string());
            Ok(())
        }

        async fn wait_for(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
            Ok(true)
        }

        async fn scroll_to_bottom(&mut self) -> Result<()> {
            self.scrolls += 1;
            if self.rounds.len() > 1 {
                let (count, height) = self.rounds.pop_front().unwrap();
                self.initial_count = count;
                self.initial_height = height;
            } else if let Some((count, height)) = self.rounds.front() {
                self.initial_count = *count;
                self.initial_height = *height;
            }
            Ok(())
        }

        async fn content_height(&mut self) -> Result<f64> {
            Ok(self.initial_height)
        }

        async fn count_elements(&mut self, _selector: &str) -> Result<usize> {
            Ok(self.initial_count)
        }

        async fn page_html(&mut self) -> Result<String> {
            Ok(self.html.clone())
        }

        async fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn fast_settings() -> BrowserConfig {
        BrowserConfig {
            scroll_pause_ms: 0,
            scroll_max: 2,
            scroll_limit: 10,
            ..Default::default()
        }
    }

    fn thread() -> ThreadInput {
        ThreadInput::new("https://forum.example.com/t-1.html")
    }

    #[tokio::test]
    async fn test_stalled_page_stops_after_scroll_max() {
        // Count and height never move: every round is a stall
        let engine = ScriptedEngine {
            initial_count: 3,
            initial_height: 1000.0,
            rounds: VecDeque::from([(3, 1000.0)]),
            html: "<html><body></body></html>".to_string(),
            ..Default::default()
        };

        let mut fetcher = BrowserFetcher::new(engine, fast_settings());
        fetcher.fetch_next(&thread(), &Cursor::Start).await.unwrap();
        assert_eq!(fetcher.engine.scrolls, 2);
    }

    #[tokio::test]
    async fn test_growth_resets_the_stall_counter() {
        // One stall, then growth, then stalls again: 1 + 1 + 2 rounds
        let engine = ScriptedEngine {
            initial_count: 3,
            initial_height: 1000.0,
            rounds: VecDeque::from([(3, 1000.0), (5, 1400.0), (5, 1400.0)]),
            html: String::new(),
            ..Default::default()
        };

        let mut fetcher = BrowserFetcher::new(engine, fast_settings());
        fetcher.fetch_next(&thread(), &Cursor::Start).await.unwrap();
        assert_eq!(fetcher.engine.scrolls, 4);
    }

    #[tokio::test]
    async fn test_scroll_limit_caps_total_rounds() {
        // Height grows forever, so the stall counter never fills up
        let mut rounds = VecDeque::new();
        for i in 0..50 {
            rounds.push_back((3usize, 1000.0 + i as f64));
        }
        let engine = ScriptedEngine {
            initial_count: 3,
            initial_height: 999.0,
            rounds,
            html: String::new(),
            ..Default::default()
        };

        let settings = BrowserConfig {
            scroll_limit: 5,
            ..fast_settings()
        };
        let mut fetcher = BrowserFetcher::new(engine, settings);
        fetcher.fetch_next(&thread(), &Cursor::Start).await.unwrap();
        assert_eq!(fetcher.engine.scrolls, 5);
    }

    #[tokio::test]
    async fn test_rendered_html_paginates_by_next_link() {
        let engine = ScriptedEngine {
            html: r#"<html><body><a rel="next" href="/t-1/page-2">Next</a></body></html>"#
                .to_string(),
            rounds: VecDeque::from([(0, 0.0)]),
            ..Default::default()
        };

        let mut fetcher = BrowserFetcher::new(engine, fast_settings());
        let page = fetcher.fetch_next(&thread(), &Cursor::Start).await.unwrap();

        assert!(page.has_more);
        assert_eq!(
            page.next,
            Some(Cursor::PageUrl(
                "https://forum.example.com/t-1/page-2".to_string()
            ))
        );
        assert_eq!(fetcher.engine.loaded, vec![thread().url]);
    }

    #[tokio::test]
    async fn test_page_cursor_overrides_entry_url() {
        let engine = ScriptedEngine {
            rounds: VecDeque::from([(0, 0.0)]),
            ..Default::default()
        };

        let mut fetcher = BrowserFetcher::new(engine, fast_settings());
        let cursor = Cursor::PageUrl("https://forum.example.com/t-1/page-2".to_string());
        let page = fetcher.fetch_next(&thread(), &cursor).await.unwrap();

        assert_eq!(page.page_url, "https://forum.example.com/t-1/page-2");
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_close_tears_down_engine() {
        let engine = ScriptedEngine::default();
        let mut fetcher = BrowserFetcher::new(engine, fast_settings());
        fetcher.close().await.unwrap();
        assert!(fetcher.engine.closed);
    }
}
