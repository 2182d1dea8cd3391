//! Thread input resolution
//!
//! Builds the ordered list of threads to crawl from up to three sources:
//! - explicit `[input] threads` entries in the config file
//! - a newline-delimited URL file (blank lines and `#` comments skipped)
//! - a CSV file with a configurable URL column
//!
//! Resolution is fully offline; any problem here is a configuration error
//! and surfaces before the first network request.

use crate::config::InputConfig;
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use std::path::Path;

/// One thread to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInput {
    /// Thread entry-page URL; also the aggregation key in outputs
    pub url: String,

    /// Optional human-readable label carried into the summary output
    pub label: Option<String>,
}

impl ThreadInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }
}

/// Resolves the full thread list from all configured sources
///
/// Sources are concatenated in order (explicit entries, URL file, CSV) and
/// deduplicated by URL with the first occurrence winning.
///
/// # Arguments
///
/// * `config` - The `[input]` section of the configuration
///
/// # Returns
///
/// * `Ok(Vec<ThreadInput>)` - At least one thread to crawl
/// * `Err(ConfigError)` - A source could not be read, the CSV column is
///   missing, or no threads were found at all
pub fn resolve_threads(config: &InputConfig) -> ConfigResult<Vec<ThreadInput>> {
    let mut threads: Vec<ThreadInput> = config
        .threads
        .iter()
        .map(|entry| ThreadInput {
            url: entry.url.clone(),
            label: entry.label.clone(),
        })
        .collect();

    if let Some(path) = &config.urls_file {
        let from_file = read_urls_file(Path::new(path))?;
        tracing::info!("Loaded {} thread URLs from {}", from_file.len(), path);
        threads.extend(from_file.into_iter().map(ThreadInput::new));
    }

    if let Some(path) = &config.urls_csv {
        let from_csv = read_urls_csv(Path::new(path), &config.csv_column)?;
        tracing::info!("Loaded {} thread URLs from CSV {}", from_csv.len(), path);
        threads.extend(from_csv.into_iter().map(ThreadInput::new));
    }

    // Drop duplicate URLs, keeping the first occurrence
    let mut seen = HashSet::new();
    threads.retain(|t| {
        if seen.insert(t.url.clone()) {
            true
        } else {
            tracing::debug!("Skipping duplicate thread URL: {}", t.url);
            false
        }
    });

    if threads.is_empty() {
        return Err(ConfigError::Validation(
            "no thread URLs resolved from the configured sources".to_string(),
        ));
    }

    Ok(threads)
}

/// Reads a newline-delimited URL file, skipping blanks and `#` comments
fn read_urls_file(path: &Path) -> ConfigResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ThreadSource {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Reads thread URLs from the named column of a CSV file
fn read_urls_csv(path: &Path, column: &str) -> ConfigResult<Vec<String>> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| ConfigError::ThreadSource {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let headers = reader.headers().map_err(|e| ConfigError::ThreadSource {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    // An entirely empty file has no header row and contributes nothing
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let column_index = match headers.iter().position(|h| h == column) {
        Some(idx) => idx,
        None => {
            return Err(ConfigError::MissingColumn {
                column: column.to_string(),
                available: headers.iter().map(str::to_string).collect(),
            })
        }
    };

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ConfigError::ThreadSource {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let url = record.get(column_index).unwrap_or("").trim();
        if !url.is_empty() && !url.starts_with('#') {
            urls.push(url.to_string());
        }
    }

    Ok(urls)
}
