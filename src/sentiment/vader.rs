//! VADER sentiment engine
//!
//! Wraps the `vader_sentiment` crate, a Rust port of the full VADER
//! lexicon-and-rules algorithm (negation, intensifiers, degree modifiers).
//! The analyzer borrows from process-wide lexicon tables, so building one
//! is cheap and the scorer is freely shareable.

use crate::sentiment::{Label, Scorer, Sentiment};
use vader_sentiment::SentimentIntensityAnalyzer;

pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for VaderScorer {
    fn name(&self) -> &'static str {
        "vader"
    }

    fn score_cleaned(&self, cleaned: &str) -> Sentiment {
        let scores = self.analyzer.polarity_scores(cleaned);
        let compound = scores.get("compound").copied().unwrap_or(0.0);

        Sentiment {
            compound,
            pos: scores.get("pos").copied().unwrap_or(0.0),
            neg: scores.get("neg").copied().unwrap_or(0.0),
            neu: scores.get("neu").copied().unwrap_or(0.0),
            label: Label::from_compound(compound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let scorer = VaderScorer::new();
        let result = scorer.score("This stock is doing great, fantastic results");
        assert!(result.compound > 0.05);
        assert_eq!(result.label, Label::Positive);
        assert!(result.pos > 0.0);
    }

    #[test]
    fn test_negative_text() {
        let scorer = VaderScorer::new();
        let result = scorer.score("Terrible quarter, horrible management, awful outlook");
        assert!(result.compound < -0.05);
        assert_eq!(result.label, Label::Negative);
        assert!(result.neg > 0.0);
    }

    #[test]
    fn test_label_matches_compound() {
        let scorer = VaderScorer::new();
        for text in ["love this", "hate this", "the price is a number"] {
            let result = scorer.score(text);
            assert_eq!(result.label, Label::from_compound(result.compound));
        }
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = VaderScorer::new();
        let plain = scorer.score("this is good");
        let negated = scorer.score("this is not good");
        assert!(plain.compound > negated.compound);
    }
}
