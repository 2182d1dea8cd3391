//! Configuration module for Forum-Pulse
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use forum_pulse::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetch strategy: {:?}", config.fetch.strategy);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, BrowserConfig, Config, ExtractConfig, FetchConfig, FetchStrategy, HttpConfig,
    InputConfig, OutputConfig, SentimentConfig, SentimentEngine, ThreadEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
