//! Text sentiment scoring port trait.

use crate::domain::news::SentimentScore;

/// Scores one text. Implementations return sentiment in [-1, 1] and
/// confidence in [0, 1].
pub trait SentimentScorer {
    fn score(&self, text: &str) -> SentimentScore;
}
