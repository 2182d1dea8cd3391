//! Forum-Pulse: a forum thread sentiment pipeline
//!
//! This crate implements a batch pipeline that crawls forum threads page by
//! page, extracts individual posts, scores each post's text for sentiment,
//! and writes a flat CSV of scored posts plus a JSON summary per thread.

pub mod config;
pub mod crawler;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod sentiment;

use thiserror::Error;

/// Main error type for Forum-Pulse operations
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("API response for {url} could not be decoded: {message}")]
    ApiDecode { url: String, message: String },

    #[error("Render engine error: {0}")]
    Render(String),

    #[error("Thread URL '{0}' has no numeric section id")]
    InvalidThreadUrl(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to read thread URLs from {path}: {message}")]
    ThreadSource { path: String, message: String },

    #[error("CSV column '{column}' not found; available columns: {}", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
}

/// Result type alias for Forum-Pulse operations
pub type Result<T> = std::result::Result<T, PulseError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Cursor, PageContent, PageFetcher, Post, RawPage, RetryPolicy};
pub use input::ThreadInput;
pub use pipeline::{run_pipeline, PipelineReport, ScoredPost, ThreadSummary};
pub use sentiment::{Label, Scorer, Sentiment};
