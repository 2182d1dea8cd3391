//! Structured message API fetch strategy
//!
//! Talks to the forum's JSON message endpoint instead of scraping pages.
//! Batches are offset-paginated: a full batch means more may follow, a
//! short or empty batch means the thread is exhausted. The numeric section
//! id the endpoint needs is parsed out of the thread URL.

use crate::config::ApiConfig;
use crate::crawler::fetcher::{
    get_with_retries, Cursor, PageContent, PageFetcher, RawPage, RetryPolicy,
};
use crate::input::ThreadInput;
use crate::{PulseError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// One raw message as returned by the message endpoint
///
/// All fields are optional; unknown fields are ignored. `msg_id` arrives
/// as either a JSON number or a string depending on the endpoint version,
/// hence the untyped value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    pub heading: Option<String>,
    pub message: Option<String>,
    pub msg_id: Option<serde_json::Value>,
    pub user_nick_name: Option<String>,
    #[serde(rename = "uidNickname")]
    pub uid_nick_name: Option<String>,
    pub ent_date: Option<String>,
    pub repost_date: Option<String>,
    #[serde(rename = "urlThread")]
    pub url_thread: Option<String>,
}

impl ApiMessage {
    /// Message id as a string, whatever the wire representation was
    pub fn post_id(&self) -> Option<String> {
        match &self.msg_id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// First `-<digits>` group in the URL path, optionally trailed by `.html`
static SECTION_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([0-9]+)(?:\.html)?").unwrap());

/// Parses the numeric section id out of a thread URL
///
/// # Arguments
///
/// * `url` - Thread entry-page URL
///
/// # Returns
///
/// * `Ok(u64)` - The section id
/// * `Err(PulseError::InvalidThreadUrl)` - No numeric id in the URL
pub fn parse_section_id(url: &str) -> Result<u64> {
    SECTION_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| PulseError::InvalidThreadUrl(url.to_string()))
}

/// Pulls the message list out of the response envelope
///
/// The expected shape is `{ "data": { "list": [ ... ] } }`; a missing or
/// misshapen `data.list` yields an empty batch rather than an error.
fn parse_batch(value: &serde_json::Value) -> Vec<ApiMessage> {
    value
        .get("data")
        .and_then(|data| data.get("list"))
        .and_then(|list| serde_json::from_value(list.clone()).ok())
        .unwrap_or_default()
}

/// Offset-paginated JSON fetch strategy
pub struct ApiFetcher {
    client: Client,
    policy: RetryPolicy,
    config: ApiConfig,
}

impl ApiFetcher {
    pub fn new(client: Client, policy: RetryPolicy, config: ApiConfig) -> Self {
        Self {
            client,
            policy,
            config,
        }
    }

    fn request_url(&self, section_id: u64, offset: u64) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.query_pairs_mut()
            .append_pair("section", "topic")
            .append_pair("sectionId", &section_id.to_string())
            .append_pair("limitStart", &offset.to_string())
            .append_pair("limitCount", &self.config.limit_count.to_string())
            .append_pair("msgIdReference", "");
        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for ApiFetcher {
    async fn fetch_next(&mut self, thread: &ThreadInput, cursor: &Cursor) -> Result<RawPage> {
        let section_id = parse_section_id(&thread.url)?;
        let offset = match cursor {
            Cursor::Offset(offset) => *offset,
            _ => 0,
        };

        let request_url = self.request_url(section_id, offset)?;
        let response = get_with_retries(&self.client, request_url.as_str(), &self.policy).await?;

        let value: serde_json::Value =
            response.json().await.map_err(|e| PulseError::ApiDecode {
                url: request_url.to_string(),
                message: e.to_string(),
            })?;

        let batch = parse_batch(&value);
        tracing::debug!(
            "API batch for section {}: offset {}, {} messages",
            section_id,
            offset,
            batch.len()
        );

        // A full batch means there may be more; a short one ends the thread
        let limit = self.config.limit_count as u64;
        let has_more = batch.len() as u64 == limit;

        Ok(RawPage {
            page_url: request_url.to_string(),
            content: PageContent::Batch(batch),
            next: has_more.then_some(Cursor::Offset(offset + limit)),
            has_more,
        })
    }
}
