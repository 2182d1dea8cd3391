//! Rendering engine seam for the browser fetch strategy
//!
//! The browser fetcher only needs a handful of primitives: load a URL,
//! wait for a selector, scroll, measure, and read the rendered HTML. They
//! are expressed as a trait so the scroll loop can be tested against a
//! scripted stub; [`ChromiumEngine`] is the production implementation.

mod chromium;

pub use chromium::ChromiumEngine;

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Primitives the browser fetcher drives
///
/// Browser and page management (launching, installation, teardown details)
/// stay behind this seam.
#[async_trait]
pub trait RenderEngine: Send {
    /// Navigates to a URL and waits for the initial load
    async fn load(&mut self, url: &str) -> Result<()>;

    /// Waits until an element matching the selector exists
    ///
    /// Returns `false` on timeout; a page without the expected markup is
    /// still worth reading, so this never errors for a missing element.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Scrolls the page to its current bottom
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Current document height in pixels
    async fn content_height(&mut self) -> Result<f64>;

    /// Number of elements currently matching the selector
    async fn count_elements(&mut self, selector: &str) -> Result<usize>;

    /// Full rendered HTML of the current page
    async fn page_html(&mut self) -> Result<String>;

    /// Tears the engine down
    async fn close(&mut self) -> Result<()>;
}
