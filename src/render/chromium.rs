//! Headless Chrome rendering engine
//!
//! Drives a Chrome/Chromium instance over the DevTools protocol via
//! `chromiumoxide`. The browser launches lazily on the first `load` and a
//! single tab is reused for every page within the run. Internal errors use
//! `anyhow` for context chaining and are flattened into
//! [`PulseError::Render`] at the trait boundary.

use crate::config::BrowserConfig;
use crate::render::RenderEngine;
use crate::{PulseError, Result};
use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use std::time::Duration;

pub struct ChromiumEngine {
    settings: BrowserConfig,
    browser: Option<Browser>,
    page: Option<Page>,
}

impl ChromiumEngine {
    /// Creates the engine without launching anything
    pub fn new(settings: BrowserConfig) -> Self {
        Self {
            settings,
            browser: None,
            page: None,
        }
    }

    /// Launches the browser if it is not already running
    async fn ensure_browser(&mut self) -> anyhow::Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        tracing::info!(
            "Launching {} browser",
            if self.settings.headless {
                "headless"
            } else {
                "headed"
            }
        );

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(self.settings.wait_timeout_secs.max(10)))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if self.settings.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        if let Some(path) = &self.settings.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        // The handler must be polled for the browser connection to work
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {e}");
                }
            }
        });

        self.browser = Some(browser);
        Ok(())
    }

    async fn load_inner(&mut self, url: &str) -> anyhow::Result<()> {
        self.ensure_browser().await?;
        let browser = self.browser.as_ref().context("browser not running")?;

        match &self.page {
            Some(page) => {
                page.goto(url)
                    .await
                    .with_context(|| format!("navigation to {url} failed"))?;
                page.wait_for_navigation()
                    .await
                    .context("navigation did not settle")?;
            }
            None => {
                let page = browser
                    .new_page(url)
                    .await
                    .with_context(|| format!("failed to open {url}"))?;
                page.wait_for_navigation()
                    .await
                    .context("navigation did not settle")?;
                self.page = Some(page);
            }
        }

        Ok(())
    }

    fn page(&self) -> anyhow::Result<&Page> {
        self.page.as_ref().context("no page loaded")
    }
}

/// Flattens an internal error chain into the crate error type
fn render_err(e: anyhow::Error) -> PulseError {
    PulseError::Render(format!("{e:#}"))
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn load(&mut self, url: &str) -> Result<()> {
        self.load_inner(url).await.map_err(render_err)
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let page = self.page().map_err(render_err)?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        let page = self.page().map_err(render_err)?;
        page.evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| PulseError::Render(format!("scroll failed: {e}")))?;
        Ok(())
    }

    async fn content_height(&mut self) -> Result<f64> {
        let page = self.page().map_err(render_err)?;
        let height = page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| PulseError::Render(format!("height read failed: {e}")))?
            .into_value::<f64>()
            .map_err(|e| PulseError::Render(format!("height was not a number: {e}")))?;
        Ok(height)
    }

    async fn count_elements(&mut self, selector: &str) -> Result<usize> {
        let page = self.page().map_err(render_err)?;
        // No matches comes back as an error from the protocol; treat as zero
        Ok(page
            .find_elements(selector)
            .await
            .map(|elements| elements.len())
            .unwrap_or(0))
    }

    async fn page_html(&mut self) -> Result<String> {
        let page = self.page().map_err(render_err)?;
        page.content()
            .await
            .map_err(|e| PulseError::Render(format!("failed to read page HTML: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("Failed to close page: {e}");
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {e}");
            } else {
                tracing::info!("Browser shut down");
            }
        }
        Ok(())
    }
}
