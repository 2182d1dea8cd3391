//! Pipeline orchestration
//!
//! Runs the whole batch: crawl each configured thread in order, score the
//! collected posts, aggregate per thread, and write the two output files.
//! One thread failing never stops the run; the pipeline reports failed
//! threads at the end and writes whatever it did collect.

mod aggregate;

pub use aggregate::{summarize_thread, ThreadSummary};

use crate::config::Config;
use crate::crawler::{PageFetcher, Post, ThreadCrawler};
use crate::input::ThreadInput;
use crate::output::{write_posts_csv, write_summary_json};
use crate::sentiment::{Label, Scorer};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// One row of the post-level output
///
/// Field order here is the CSV column order; keep it stable.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub thread_url: String,
    pub page_url: String,
    pub post_id: Option<String>,
    pub author: Option<String>,
    pub posted_at: Option<String>,
    pub heading: Option<String>,
    pub text: String,
    pub compound: f64,
    pub label: Label,
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
}

/// How one thread's crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    Completed,
    Failed,
}

/// Per-thread outcome for operator reporting
#[derive(Debug, Clone)]
pub struct ThreadReport {
    pub url: String,
    pub status: ThreadStatus,
    pub pages_fetched: u32,
    pub posts_collected: usize,

    /// The failure, for threads that produced nothing
    pub error: Option<String>,

    /// Mid-crawl fetch failure that ended paging early without failing
    /// the thread
    pub truncation: Option<String>,
}

/// Whole-run outcome
#[derive(Debug)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub threads: Vec<ThreadReport>,
    pub total_posts: usize,
}

impl PipelineReport {
    pub fn completed_count(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.status == ThreadStatus::Completed)
            .count()
    }

    pub fn failed_urls(&self) -> Vec<&str> {
        self.threads
            .iter()
            .filter(|t| t.status == ThreadStatus::Failed)
            .map(|t| t.url.as_str())
            .collect()
    }
}

/// Text a post is scored on: heading plus body when the heading is a
/// distinct line, just the body otherwise (heading-only posts already
/// carry the heading as their text)
fn scored_content(post: &Post) -> String {
    match &post.heading {
        Some(heading) if heading != &post.text => format!("{} {}", heading, post.text),
        _ => post.text.clone(),
    }
}

fn score_posts(thread: &ThreadInput, posts: Vec<Post>, scorer: &dyn Scorer) -> Vec<ScoredPost> {
    posts
        .into_iter()
        .map(|post| {
            let sentiment = scorer.score(&scored_content(&post));
            ScoredPost {
                thread_url: thread.url.clone(),
                page_url: post.page_url,
                post_id: post.post_id,
                author: post.author,
                posted_at: post.posted_at,
                heading: post.heading,
                text: post.text,
                compound: sentiment.compound,
                label: sentiment.label,
                pos: sentiment.pos,
                neg: sentiment.neg,
                neu: sentiment.neu,
            }
        })
        .collect()
}

/// Runs the full pipeline over the resolved thread list
///
/// Threads are processed sequentially in input order. A thread failure is
/// logged and skipped; outputs are written even when threads failed or the
/// run was interrupted between threads. Only output-write failures (and
/// nothing per-thread) propagate as errors.
///
/// # Arguments
///
/// * `config` - The full run configuration
/// * `threads` - Resolved thread inputs, in order
/// * `scorer` - The resolved sentiment engine
/// * `fetcher` - The fetch strategy for every thread in this run
/// * `shutdown` - Set externally to stop before the next thread
pub async fn run_pipeline(
    config: &Config,
    threads: &[ThreadInput],
    scorer: &dyn Scorer,
    fetcher: &mut dyn PageFetcher,
    shutdown: &AtomicBool,
) -> Result<PipelineReport> {
    let started_at = Utc::now();
    let crawler = ThreadCrawler::new(config.fetch.clone(), config.extract.clone());

    let mut rows: Vec<ScoredPost> = Vec::new();
    let mut summaries: Vec<ThreadSummary> = Vec::new();
    let mut reports: Vec<ThreadReport> = Vec::new();

    for (idx, thread) in threads.iter().enumerate() {
        if shutdown.load(Ordering::SeqCst) {
            tracing::warn!(
                "Interrupted; skipping {} remaining threads",
                threads.len() - idx
            );
            break;
        }

        tracing::info!("[{}/{}] Crawling {}", idx + 1, threads.len(), thread.url);

        match crawler.crawl(fetcher, thread).await {
            Ok(crawl) => {
                let scored = score_posts(thread, crawl.posts, scorer);
                tracing::info!(
                    "  {} posts from {} pages",
                    scored.len(),
                    crawl.pages_fetched
                );

                summaries.push(summarize_thread(thread, &scored));
                reports.push(ThreadReport {
                    url: thread.url.clone(),
                    status: ThreadStatus::Completed,
                    pages_fetched: crawl.pages_fetched,
                    posts_collected: scored.len(),
                    error: None,
                    truncation: crawl.truncation,
                });
                rows.extend(scored);
            }
            Err(e) => {
                tracing::warn!("  Thread failed: {}", e);
                reports.push(ThreadReport {
                    url: thread.url.clone(),
                    status: ThreadStatus::Failed,
                    pages_fetched: 0,
                    posts_collected: 0,
                    error: Some(e.to_string()),
                    truncation: None,
                });
            }
        }
    }

    if let Err(e) = fetcher.close().await {
        tracing::warn!("Fetcher teardown failed: {}", e);
    }

    write_posts_csv(Path::new(&config.output.posts_path), &rows)?;
    write_summary_json(Path::new(&config.output.summary_path), &summaries)?;

    let finished_at = Utc::now();
    let report = PipelineReport {
        started_at,
        finished_at,
        total_posts: rows.len(),
        threads: reports,
    };

    tracing::info!(
        "Run finished: {} posts across {} threads in {:.1}s",
        report.total_posts,
        report.completed_count(),
        (finished_at - started_at).num_milliseconds() as f64 / 1000.0
    );
    tracing::info!("  Posts:   {}", config.output.posts_path);
    tracing::info!("  Summary: {}", config.output.summary_path);

    let failed = report.failed_urls();
    if !failed.is_empty() {
        tracing::warn!("{} thread(s) failed:", failed.len());
        for url in &failed {
            tracing::warn!("  - {}", url);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(heading: Option<&str>, text: &str) -> Post {
        Post {
            post_id: None,
            author: None,
            posted_at: None,
            heading: heading.map(str::to_string),
            text: text.to_string(),
            page_url: "https://forum.example.com/t-1.html".to_string(),
        }
    }

    #[test]
    fn test_scored_content_joins_distinct_heading() {
        let p = post(Some("Results out"), "Profit up big");
        assert_eq!(scored_content(&p), "Results out Profit up big");
    }

    #[test]
    fn test_scored_content_skips_heading_only_duplicate() {
        // Heading-only posts use the heading as text; do not double it
        let p = post(Some("Results out"), "Results out");
        assert_eq!(scored_content(&p), "Results out");
    }

    #[test]
    fn test_scored_content_plain_body() {
        let p = post(None, "just a body");
        assert_eq!(scored_content(&p), "just a body");
    }

    #[test]
    fn test_score_posts_keeps_source_order() {
        use crate::sentiment::LexiconScorer;

        let thread = ThreadInput::new("https://forum.example.com/t-1.html");
        let posts = vec![post(None, "strong rally"), post(None, "bad crash")];
        let scored = score_posts(&thread, posts, &LexiconScorer::new());

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].text, "strong rally");
        assert_eq!(scored[0].label, Label::Positive);
        assert_eq!(scored[1].label, Label::Negative);
        assert_eq!(scored[0].thread_url, thread.url);
    }
}
