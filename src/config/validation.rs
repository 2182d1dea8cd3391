use crate::config::types::{
    ApiConfig, BrowserConfig, Config, ExtractConfig, FetchConfig, HttpConfig, InputConfig,
    OutputConfig, SentimentConfig, SentimentEngine,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_fetch_config(&config.fetch)?;
    validate_http_config(&config.http)?;
    validate_browser_config(&config.browser)?;
    validate_api_config(&config.api)?;
    validate_extract_config(&config.extract)?;
    validate_sentiment_config(&config.sentiment)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates thread input sources
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.threads.is_empty() && config.urls_file.is_none() && config.urls_csv.is_none() {
        return Err(ConfigError::Validation(
            "no thread sources configured; set [input] threads, urls-file, or urls-csv"
                .to_string(),
        ));
    }

    for entry in &config.threads {
        let url = Url::parse(&entry.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid thread URL '{}': {}", entry.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Thread URL '{}' must use http or https",
                entry.url
            )));
        }
    }

    if config.csv_column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv-column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl loop configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    // max_pages and max_messages allow 0 (unbounded)

    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_empty_pages must be >= 1, got {}",
            config.max_empty_pages
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates headless browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    Selector::parse(&config.post_selector).map_err(|e| {
        ConfigError::Validation(format!(
            "post_selector '{}' is not a valid CSS selector: {}",
            config.post_selector, e
        ))
    })?;

    if config.scroll_max < 1 {
        return Err(ConfigError::Validation(format!(
            "scroll_max must be >= 1, got {}",
            config.scroll_max
        )));
    }

    if config.scroll_limit < config.scroll_max {
        return Err(ConfigError::Validation(format!(
            "scroll_limit ({}) must be >= scroll_max ({})",
            config.scroll_limit, config.scroll_max
        )));
    }

    Ok(())
}

/// Validates message API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api base-url: {}", e)))?;

    if config.limit_count < 1 {
        return Err(ConfigError::Validation(format!(
            "limit_count must be >= 1, got {}",
            config.limit_count
        )));
    }

    Ok(())
}

/// Validates post extraction configuration
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.min_text_len < 1 {
        return Err(ConfigError::Validation(format!(
            "min_text_len must be >= 1, got {}",
            config.min_text_len
        )));
    }

    Ok(())
}

/// Validates sentiment engine selection against compiled features
fn validate_sentiment_config(config: &SentimentConfig) -> Result<(), ConfigError> {
    if config.engine == SentimentEngine::Vader && !cfg!(feature = "vader") {
        return Err(ConfigError::Validation(
            "sentiment engine 'vader' requested but this build does not include it \
             (rebuild with the 'vader' feature, or use 'auto' / 'lexicon')"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.posts_path.is_empty() {
        return Err(ConfigError::Validation(
            "posts_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
