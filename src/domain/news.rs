//! News events and their sentiment scores.

use chrono::NaiveDate;

/// A free-text news snippet about one instrument on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentEvent {
    pub date: NaiveDate,
    pub ticker: String,
    pub text: String,
}

/// Output of a sentiment scorer for a single text.
///
/// `sentiment` lies in [-1, 1], `confidence` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SentimentScore {
    pub sentiment: f64,
    pub confidence: f64,
}

/// Confidence-weighted sentiment for one (date, ticker).
#[derive(Debug, Clone, PartialEq)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub ticker: String,
    pub sentiment: f64,
    pub confidence: f64,
    pub news_count: usize,
}

impl DailySentiment {
    /// The no-news default. Zero confidence marks the day as uninformative.
    pub fn neutral(date: NaiveDate, ticker: &str) -> Self {
        DailySentiment {
            date,
            ticker: ticker.to_string(),
            sentiment: 0.0,
            confidence: 0.0,
            news_count: 0,
        }
    }
}
