//! Sentiment scoring for extracted posts
//!
//! Two interchangeable engines sit behind the [`Scorer`] trait:
//! - the full VADER algorithm (compiled in with the `vader` feature)
//! - a small built-in keyword lexicon for offline builds
//!
//! The engine is resolved once at startup; everything downstream only sees
//! the trait object. Both engines share the same preprocessing and the same
//! compound-to-label thresholds, so swapping one for the other changes
//! nothing but the scores themselves.

mod lexicon;
#[cfg(feature = "vader")]
mod vader;

pub use lexicon::LexiconScorer;
#[cfg(feature = "vader")]
pub use vader::VaderScorer;

use crate::config::SentimentEngine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Compound score at or above this is labeled positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below this is labeled negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Word-ish tokens; everything else is stripped before scoring
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w']+").unwrap());

/// Discrete sentiment label derived from the compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Neutral,
    Negative,
}

impl Label {
    /// Maps a compound score onto a label
    ///
    /// The thresholds are inclusive: exactly 0.05 is positive, exactly
    /// -0.05 is negative, everything strictly between is neutral.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Label::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Label::Positive => "positive",
            Label::Neutral => "neutral",
            Label::Negative => "negative",
        };
        write!(f, "{}", s)
    }
}

/// Full sentiment result for one piece of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    /// Normalized overall score in [-1.0, 1.0]
    pub compound: f64,

    /// Positive component score in [0.0, 1.0]
    pub pos: f64,

    /// Negative component score in [0.0, 1.0]
    pub neg: f64,

    /// Neutral component score in [0.0, 1.0]
    pub neu: f64,

    /// Label derived from the compound score
    pub label: Label,
}

impl Sentiment {
    /// The fixed result for empty or non-word input
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            pos: 0.0,
            neg: 0.0,
            neu: 1.0,
            label: Label::Neutral,
        }
    }
}

/// A sentiment engine
///
/// Implementations must be stateless between calls and shareable across
/// tasks; nothing in the pipeline assumes exclusive access.
pub trait Scorer: Send + Sync {
    /// Short engine name for startup logging
    fn name(&self) -> &'static str;

    /// Scores already-preprocessed, non-empty text
    fn score_cleaned(&self, cleaned: &str) -> Sentiment;

    /// Scores raw text
    ///
    /// Input is reduced to word tokens first; input with no word tokens
    /// (including the empty string) deterministically scores neutral
    /// without touching the engine.
    fn score(&self, text: &str) -> Sentiment {
        let cleaned = clean_for_scoring(text);
        if cleaned.is_empty() {
            return Sentiment::neutral();
        }
        self.score_cleaned(&cleaned)
    }
}

/// Reduces text to whitespace-joined `[\w']+` tokens
pub fn clean_for_scoring(text: &str) -> String {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves the configured engine to a concrete scorer
///
/// `Auto` uses VADER when the crate was built with it and the lexicon
/// otherwise. Requesting `Vader` on a build without the feature is rejected
/// during config validation, before this runs.
pub fn resolve_scorer(engine: SentimentEngine) -> Box<dyn Scorer> {
    match engine {
        SentimentEngine::Lexicon => Box::new(LexiconScorer::new()),
        #[cfg(feature = "vader")]
        SentimentEngine::Auto | SentimentEngine::Vader => Box::new(VaderScorer::new()),
        #[cfg(not(feature = "vader"))]
        SentimentEngine::Auto | SentimentEngine::Vader => Box::new(LexiconScorer::new()),
    }
}
