//! Built-in keyword lexicon scorer
//!
//! A deliberately small finance-flavored word list that keeps the pipeline
//! fully offline-capable. Scores are much coarser than VADER's but use the
//! same shape and the same label thresholds.

use crate::sentiment::{Label, Scorer, Sentiment};
use once_cell::sync::Lazy;
use std::collections::HashSet;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "buy",
        "long",
        "up",
        "bull",
        "bullish",
        "gain",
        "gains",
        "profit",
        "profits",
        "green",
        "strong",
        "beat",
        "beats",
        "outperform",
        "great",
        "good",
        "positive",
        "surge",
        "rally",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sell",
        "short",
        "down",
        "bear",
        "bearish",
        "loss",
        "losses",
        "red",
        "weak",
        "miss",
        "missed",
        "underperform",
        "bad",
        "negative",
        "fall",
        "plunge",
        "crash",
    ]
    .into_iter()
    .collect()
});

/// Keyword-counting scorer
///
/// compound = (positive hits - negative hits) / sqrt(token count), clamped
/// to [-1.0, 1.0]. Component scores are the hit fractions.
#[derive(Debug, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for LexiconScorer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn score_cleaned(&self, cleaned: &str) -> Sentiment {
        let tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        let total = tokens.len().max(1);

        let pos_hits = tokens
            .iter()
            .filter(|t| POSITIVE_WORDS.contains(t.as_str()))
            .count();
        let neg_hits = tokens
            .iter()
            .filter(|t| NEGATIVE_WORDS.contains(t.as_str()))
            .count();
        // The word lists are disjoint, so this cannot underflow
        let neu_hits = total - pos_hits - neg_hits;

        let raw = (pos_hits as f64 - neg_hits as f64) / (total as f64).sqrt();
        let compound = raw.clamp(-1.0, 1.0);

        Sentiment {
            compound,
            pos: pos_hits as f64 / total as f64,
            neg: neg_hits as f64 / total as f64,
            neu: neu_hits as f64 / total as f64,
            label: Label::from_compound(compound),
        }
    }
}
