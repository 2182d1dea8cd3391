use serde::Deserialize;

/// Main configuration structure for Forum-Pulse
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Thread input sources
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Explicit thread entries
    #[serde(default)]
    pub threads: Vec<ThreadEntry>,

    /// Newline-delimited file of thread URLs (blank lines and # comments skipped)
    #[serde(rename = "urls-file")]
    pub urls_file: Option<String>,

    /// CSV file containing thread URLs in a named column
    #[serde(rename = "urls-csv")]
    pub urls_csv: Option<String>,

    /// Column to read thread URLs from in the CSV file
    #[serde(rename = "csv-column", default = "default_csv_column")]
    pub csv_column: String,
}

/// One explicitly configured thread
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadEntry {
    /// Thread entry-page URL
    pub url: String,

    /// Optional human-readable label carried into the summary output
    pub label: Option<String>,
}

/// Which fetch strategy pulls thread pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP GET of each page, following next-page links
    Static,
    /// Headless-browser rendering with infinite-scroll support
    Browser,
    /// Offset-paginated JSON message API
    Api,
}

/// Crawl loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Fetch strategy for every thread in this run
    #[serde(default = "default_strategy")]
    pub strategy: FetchStrategy,

    /// Maximum pages (or API batches) fetched per thread; 0 = unbounded
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Overall cap on accepted posts per thread; 0 = unbounded
    #[serde(rename = "max-messages", default)]
    pub max_messages: u32,

    /// Consecutive pages yielding no new posts before the thread is
    /// considered exhausted
    #[serde(rename = "max-empty-pages", default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Pause between successive page fetches within a thread (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per page before giving up (first try included)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds, doubled each retry)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Headless browser configuration (browser strategy only)
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run the browser without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Selector for post content; used both as the page readiness wait and
    /// to detect scroll progress
    #[serde(rename = "post-selector", default = "default_post_selector")]
    pub post_selector: String,

    /// Seconds to wait for the readiness selector before proceeding anyway
    #[serde(rename = "wait-timeout-secs", default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Consecutive scroll rounds without progress before stopping
    #[serde(rename = "scroll-max", default = "default_scroll_max")]
    pub scroll_max: u32,

    /// Hard cap on total scroll rounds per page
    #[serde(rename = "scroll-limit", default = "default_scroll_limit")]
    pub scroll_limit: u32,

    /// Pause after each scroll round (milliseconds)
    #[serde(rename = "scroll-pause-ms", default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Path to a Chrome/Chromium executable (auto-detected when unset)
    #[serde(rename = "chrome-path")]
    pub chrome_path: Option<String>,
}

/// Message API configuration (api strategy only)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Message API endpoint
    #[serde(rename = "base-url", default = "default_api_base_url")]
    pub base_url: String,

    /// Messages requested per batch
    #[serde(rename = "limit-count", default = "default_limit_count")]
    pub limit_count: u32,
}

/// Post extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Minimum cleaned-text length for the last-resort block scan
    #[serde(rename = "min-text-len", default = "default_min_text_len")]
    pub min_text_len: usize,
}

/// Which sentiment engine scores posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentEngine {
    /// VADER when compiled in, lexicon otherwise
    Auto,
    /// Require the VADER engine
    Vader,
    /// Force the built-in keyword lexicon
    Lexicon,
}

/// Sentiment scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_engine")]
    pub engine: SentimentEngine,
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the scored-posts CSV file
    #[serde(rename = "posts-path", default = "default_posts_path")]
    pub posts_path: String,

    /// Path to the per-thread summary JSON file
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,
}

fn default_csv_column() -> String {
    "forum_topics_url".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            urls_file: None,
            urls_csv: None,
            csv_column: default_csv_column(),
        }
    }
}

fn default_strategy() -> FetchStrategy {
    FetchStrategy::Static
}

fn default_max_pages() -> u32 {
    3
}

fn default_max_empty_pages() -> u32 {
    2
}

fn default_delay_ms() -> u64 {
    1200
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    25
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_post_selector() -> String {
    "div[class*='postItem_text_paragraph']".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_scroll_max() -> u32 {
    6
}

fn default_scroll_limit() -> u32 {
    20
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_api_base_url() -> String {
    "https://api.moneycontrol.com/mcapi/v2/mmb/get-messages/".to_string()
}

fn default_limit_count() -> u32 {
    100
}

fn default_min_text_len() -> usize {
    80
}

fn default_engine() -> SentimentEngine {
    SentimentEngine::Auto
}

fn default_posts_path() -> String {
    "data/posts.csv".to_string()
}

fn default_summary_path() -> String {
    "data/summary.json".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_pages: default_max_pages(),
            max_messages: 0,
            max_empty_pages: default_max_empty_pages(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            post_selector: default_post_selector(),
            wait_timeout_secs: default_wait_timeout_secs(),
            scroll_max: default_scroll_max(),
            scroll_limit: default_scroll_limit(),
            scroll_pause_ms: default_scroll_pause_ms(),
            chrome_path: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            limit_count: default_limit_count(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_text_len: default_min_text_len(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            posts_path: default_posts_path(),
            summary_path: default_summary_path(),
        }
    }
}
