//! Post extraction from fetched pages
//!
//! Pure functions, no I/O. Two input shapes:
//! - HTML documents: a rendered-markup fast path, then an ordered chain of
//!   selector rules where the first rule producing posts wins, then a
//!   last-resort scan for sizeable text blocks
//! - API batches: a straight field mapping
//!
//! Also home to next-page link discovery, since both page-oriented fetch
//! strategies paginate off the returned HTML.

use crate::config::ExtractConfig;
use crate::crawler::api::ApiMessage;
use crate::crawler::fetcher::{PageContent, RawPage};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// One extracted forum post, before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Source-native post id, when the markup exposes one
    pub post_id: Option<String>,

    /// Display name of the poster
    pub author: Option<String>,

    /// Source-native timestamp, passed through verbatim
    pub posted_at: Option<String>,

    /// Post title line, when the source has one
    pub heading: Option<String>,

    /// Cleaned post text; never empty
    pub text: String,

    /// Page or request URL the post was extracted from
    pub page_url: String,
}

/// Identity used to drop duplicate posts within a thread
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostKey {
    /// Native id when present
    Id(String),

    /// Text plus author for sources without ids
    Content(String, Option<String>),
}

impl Post {
    /// Dedup key: the native id when present, else text and author
    pub fn dedup_key(&self) -> PostKey {
        match &self.post_id {
            Some(id) if !id.is_empty() => PostKey::Id(id.clone()),
            _ => PostKey::Content(self.text.clone(), self.author.clone()),
        }
    }
}

/// One named selector rule in the post-matching chain
pub struct PostRule {
    pub name: &'static str,
    pub selector: &'static str,
}

/// Ordered post-matching chain; the first rule with matches wins
///
/// Ordered from most to least specific: explicit comment ids, comment
/// classes, then the looser "post" markers, then data attributes.
pub static POST_RULES: &[PostRule] = &[
    PostRule {
        name: "cmt-id",
        selector: "div[id*='cmt'], li[id*='cmt'], article[id*='cmt']",
    },
    PostRule {
        name: "cmt-class",
        selector: "div[class*='cmt'], li[class*='cmt'], article[class*='cmt']",
    },
    PostRule {
        name: "comment-id",
        selector: "div[id*='comment'], li[id*='comment'], article[id*='comment']",
    },
    PostRule {
        name: "comment-class",
        selector: "div[class*='comment'], li[class*='comment'], article[class*='comment']",
    },
    PostRule {
        name: "post-id",
        selector: "div[id*='post'], li[id*='post'], article[id*='post']",
    },
    PostRule {
        name: "post-class",
        selector: "div[class*='post'], li[class*='post'], article[class*='post']",
    },
    PostRule {
        name: "data-attrs",
        selector: "[data-post-id], [data-msgid]",
    },
];

/// Rendered forum markup: post bodies and headings as emitted by the
/// styled-component build (class hash suffix varies, hence substring match)
const RENDERED_TEXT_SELECTOR: &str = "div[class*='postItem_text_paragraph']";
const RENDERED_HEADING_SELECTOR: &str = "div[class*='postItem_heading']";

const AUTHOR_KEYWORDS: &[&str] = &["author", "user", "name", "by"];
const TIME_KEYWORDS: &[&str] = &["time", "date", "posted"];
const HEADING_KEYWORDS: &[&str] = &["heading", "title"];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace runs to single spaces and trims the ends
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Cleaned concatenation of all text under an element
fn element_text(el: &ElementRef) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Extracts posts from one fetched page or batch
pub fn extract_posts(page: &RawPage, config: &ExtractConfig) -> Vec<Post> {
    match &page.content {
        PageContent::Html(html) => extract_from_html(html, &page.page_url, config),
        PageContent::Batch(messages) => messages
            .iter()
            .filter_map(|msg| post_from_message(msg, &page.page_url))
            .collect(),
    }
}

/// Extracts posts from an HTML document
fn extract_from_html(html: &str, page_url: &str, config: &ExtractConfig) -> Vec<Post> {
    let document = Html::parse_document(html);

    // Rendered markup is unambiguous when present; take it as-is
    let rendered = extract_rendered_posts(&document, page_url);
    if !rendered.is_empty() {
        return rendered;
    }

    let mut posts = Vec::new();
    let mut seen_text = HashSet::new();

    for el in find_post_elements(&document, config) {
        let text = element_text(&el);
        // Empty blocks and repeats of an already-captured block are noise
        if text.is_empty() || !seen_text.insert(text.clone()) {
            continue;
        }

        let value = el.value();
        let post_id = value
            .attr("id")
            .or_else(|| value.attr("data-post-id"))
            .or_else(|| value.attr("data-msgid"))
            .map(str::to_string);

        posts.push(Post {
            post_id,
            author: find_first_text(&el, AUTHOR_KEYWORDS),
            posted_at: find_first_text(&el, TIME_KEYWORDS),
            heading: find_first_text(&el, HEADING_KEYWORDS),
            text,
            page_url: page_url.to_string(),
        });
    }

    posts
}

/// Pairs rendered body/heading nodes by index
///
/// A heading without a body still counts as a post; its heading doubles as
/// the text so downstream code never sees an empty post.
fn extract_rendered_posts(document: &Html, page_url: &str) -> Vec<Post> {
    let text_sel = match Selector::parse(RENDERED_TEXT_SELECTOR) {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };
    let heading_sel = match Selector::parse(RENDERED_HEADING_SELECTOR) {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let bodies: Vec<String> = document.select(&text_sel).map(|el| element_text(&el)).collect();
    let headings: Vec<String> = document
        .select(&heading_sel)
        .map(|el| element_text(&el))
        .collect();

    let mut posts = Vec::new();
    for idx in 0..bodies.len().max(headings.len()) {
        let heading = headings.get(idx).filter(|h| !h.is_empty()).cloned();
        let body = bodies.get(idx).cloned().unwrap_or_default();

        let text = if body.is_empty() {
            match &heading {
                Some(h) => h.clone(),
                None => continue,
            }
        } else {
            body
        };

        posts.push(Post {
            post_id: None,
            author: None,
            posted_at: None,
            heading,
            text,
            page_url: page_url.to_string(),
        });
    }

    posts
}

/// Runs the matcher chain, falling back to a sizeable-block scan
fn find_post_elements<'a>(document: &'a Html, config: &ExtractConfig) -> Vec<ElementRef<'a>> {
    for rule in POST_RULES {
        if let Ok(sel) = Selector::parse(rule.selector) {
            let matches: Vec<_> = document.select(&sel).collect();
            if !matches.is_empty() {
                tracing::debug!("Post rule '{}' matched {} blocks", rule.name, matches.len());
                return matches;
            }
        }
    }

    // Last resort: any block with a substantial amount of text
    let mut candidates = Vec::new();
    if let Ok(sel) = Selector::parse("article, li, div") {
        for el in document.select(&sel) {
            let text = element_text(&el);
            if text.chars().count() > config.min_text_len {
                candidates.push(el);
            }
        }
    }
    candidates
}

/// First descendant whose attribute values mention any keyword, by text
fn find_first_text(el: &ElementRef, keywords: &[&str]) -> Option<String> {
    for node in el.descendants().skip(1) {
        let child = match ElementRef::wrap(node) {
            Some(child) => child,
            None => continue,
        };

        let attrs = child
            .value()
            .attrs()
            .map(|(_, value)| value)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if keywords.iter().any(|kw| attrs.contains(kw)) {
            let text = element_text(&child);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Maps one raw API message onto a post
fn post_from_message(msg: &ApiMessage, request_url: &str) -> Option<Post> {
    let heading = clean_text(msg.heading.as_deref().unwrap_or(""));
    let body = clean_text(msg.message.as_deref().unwrap_or(""));
    if heading.is_empty() && body.is_empty() {
        return None;
    }

    let text = if body.is_empty() { heading.clone() } else { body };

    Some(Post {
        post_id: msg.post_id(),
        author: msg
            .user_nick_name
            .clone()
            .or_else(|| msg.uid_nick_name.clone()),
        posted_at: msg.ent_date.clone().or_else(|| msg.repost_date.clone()),
        heading: if heading.is_empty() { None } else { Some(heading) },
        text,
        page_url: msg
            .url_thread
            .clone()
            .unwrap_or_else(|| request_url.to_string()),
    })
}

/// Finds the next-page link in an HTML document
///
/// Preference order:
/// 1. the first `<a rel="next" href>` anchor
/// 2. the first anchor whose label, class, or aria-label mentions "next",
///    or whose label is one of `>`, `›`, `»`
///
/// The href is resolved against the current page URL; script/mail schemes
/// and links back to the current page itself are ignored.
pub fn find_next_page(html: &str, current_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(current_url).ok()?;

    if let Ok(sel) = Selector::parse("a[rel~='next'][href]") {
        for anchor in document.select(&sel) {
            if let Some(next) = resolve_candidate(&anchor, &base, current_url) {
                return Some(next);
            }
        }
    }

    if let Ok(sel) = Selector::parse("a") {
        for anchor in document.select(&sel) {
            let label = element_text(&anchor).to_lowercase();
            let classes = anchor.value().attr("class").unwrap_or("").to_lowercase();
            let aria = anchor
                .value()
                .attr("aria-label")
                .unwrap_or("")
                .to_lowercase();

            let looks_like_next = label.contains("next")
                || classes.contains("next")
                || aria.contains("next")
                || matches!(label.as_str(), ">" | "›" | "»");

            if looks_like_next {
                if let Some(next) = resolve_candidate(&anchor, &base, current_url) {
                    return Some(next);
                }
            }
        }
    }

    None
}

/// Resolves an anchor's href, discarding self-links
fn resolve_candidate(anchor: &ElementRef, base: &Url, current_url: &str) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let resolved = resolve_link(href, base)?;
    if resolved == current_url {
        return None;
    }
    Some(resolved)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs or non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
