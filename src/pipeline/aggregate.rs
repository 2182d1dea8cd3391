//! Per-thread sentiment aggregation

use crate::input::ThreadInput;
use crate::pipeline::ScoredPost;
use crate::sentiment::Label;
use serde::Serialize;

/// Aggregate sentiment for one thread
///
/// Serialized as one entry of the summary JSON. `avg_compound` is null for
/// a thread that completed with zero posts; the three ratios partition the
/// posts when there are any and are all zero otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummary {
    pub thread_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub post_count: usize,

    pub avg_compound: Option<f64>,

    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
}

/// Computes a thread's summary from its scored posts
///
/// The neutral ratio is the remainder after positive and negative, so the
/// three always account for every post.
pub fn summarize_thread(thread: &ThreadInput, posts: &[ScoredPost]) -> ThreadSummary {
    let count = posts.len();
    if count == 0 {
        return ThreadSummary {
            thread_url: thread.url.clone(),
            label: thread.label.clone(),
            post_count: 0,
            avg_compound: None,
            positive_ratio: 0.0,
            negative_ratio: 0.0,
            neutral_ratio: 0.0,
        };
    }

    let avg = posts.iter().map(|p| p.compound).sum::<f64>() / count as f64;
    let positive = posts.iter().filter(|p| p.label == Label::Positive).count();
    let negative = posts.iter().filter(|p| p.label == Label::Negative).count();
    let neutral = count - positive - negative;

    ThreadSummary {
        thread_url: thread.url.clone(),
        label: thread.label.clone(),
        post_count: count,
        avg_compound: Some(avg),
        positive_ratio: positive as f64 / count as f64,
        negative_ratio: negative as f64 / count as f64,
        neutral_ratio: neutral as f64 / count as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(compound: f64) -> ScoredPost {
        ScoredPost {
            thread_url: "https://forum.example.com/t-1.html".to_string(),
            page_url: "https://forum.example.com/t-1.html".to_string(),
            post_id: None,
            author: None,
            posted_at: None,
            heading: None,
            text: "text".to_string(),
            compound,
            label: Label::from_compound(compound),
            pos: 0.0,
            neg: 0.0,
            neu: 1.0,
        }
    }

    fn thread() -> ThreadInput {
        ThreadInput::new("https://forum.example.com/t-1.html")
    }

    #[test]
    fn test_known_compound_set() {
        // 0.8 and 0.1 are positive, -0.6 negative, 0.0 neutral
        let posts: Vec<_> = [0.8, -0.6, 0.0, 0.1].into_iter().map(scored).collect();
        let summary = summarize_thread(&thread(), &posts);

        assert_eq!(summary.post_count, 4);
        assert!((summary.avg_compound.unwrap() - 0.075).abs() < 1e-9);
        assert!((summary.positive_ratio - 0.5).abs() < 1e-9);
        assert!((summary.negative_ratio - 0.25).abs() < 1e-9);
        assert!((summary.neutral_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_ratios_partition_the_posts() {
        let posts: Vec<_> = [0.9, 0.06, -0.05, 0.01, -0.3, 0.0, 0.2]
            .into_iter()
            .map(scored)
            .collect();
        let summary = summarize_thread(&thread(), &posts);

        let total = summary.positive_ratio + summary.negative_ratio + summary.neutral_ratio;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_thread_summary() {
        let summary = summarize_thread(&thread(), &[]);
        assert_eq!(summary.post_count, 0);
        assert_eq!(summary.avg_compound, None);
        assert_eq!(summary.positive_ratio, 0.0);
        assert_eq!(summary.negative_ratio, 0.0);
        assert_eq!(summary.neutral_ratio, 0.0);
    }

    #[test]
    fn test_label_carried_from_thread_input() {
        let thread = ThreadInput {
            url: "https://forum.example.com/t-2.html".to_string(),
            label: Some("acme motors".to_string()),
        };
        let summary = summarize_thread(&thread, &[scored(0.5)]);
        assert_eq!(summary.label.as_deref(), Some("acme motors"));
    }

    #[test]
    fn test_null_average_serializes_as_json_null() {
        let summary = summarize_thread(&thread(), &[]);
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["avg_compound"].is_null());
        // Absent thread label is omitted entirely
        assert!(value.get("label").is_none());
    }
}
