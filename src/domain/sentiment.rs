//! Daily sentiment aggregation.
//!
//! Events are scored individually, grouped by (date, ticker), and reduced
//! to one confidence-weighted value per group.

use crate::domain::news::{DailySentiment, SentimentEvent, SentimentScore};
use crate::ports::sentiment_port::SentimentScorer;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Added to every event confidence before weighting.
pub const WEIGHT_FLOOR: f64 = 0.1;

/// Score one text. Blank text is neutral and never reaches the scorer.
pub fn score_text(scorer: &dyn SentimentScorer, text: &str) -> SentimentScore {
    if text.trim().is_empty() {
        return SentimentScore::default();
    }
    let raw = scorer.score(text);
    SentimentScore {
        sentiment: raw.sentiment.clamp(-1.0, 1.0),
        confidence: raw.confidence.clamp(0.0, 1.0),
    }
}

/// Reduce one day's scores. An empty slice gives the neutral default.
pub fn aggregate_scores(date: NaiveDate, ticker: &str, scores: &[SentimentScore]) -> DailySentiment {
    if scores.is_empty() {
        return DailySentiment::neutral(date, ticker);
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut confidence_sum = 0.0;
    for s in scores {
        let w = s.confidence + WEIGHT_FLOOR;
        weighted += s.sentiment * w;
        total_weight += w;
        confidence_sum += s.confidence;
    }

    DailySentiment {
        date,
        ticker: ticker.to_string(),
        sentiment: weighted / total_weight,
        confidence: confidence_sum / scores.len() as f64,
        news_count: scores.len(),
    }
}

/// One row per (date, ticker) that has at least one event, sorted by date
/// then ticker. Days without events are filled later by the assembler.
pub fn aggregate_daily(
    events: &[SentimentEvent],
    scorer: &dyn SentimentScorer,
) -> Vec<DailySentiment> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<SentimentScore>> = BTreeMap::new();
    for event in events {
        groups
            .entry((event.date, event.ticker.as_str()))
            .or_default()
            .push(score_text(scorer, &event.text));
    }

    groups
        .into_iter()
        .map(|((date, ticker), scores)| aggregate_scores(date, ticker, &scores))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    /// Scores by keyword and counts calls.
    struct KeywordScorer {
        calls: Cell<usize>,
    }

    impl KeywordScorer {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl SentimentScorer for KeywordScorer {
        fn score(&self, text: &str) -> SentimentScore {
            self.calls.set(self.calls.get() + 1);
            if text.contains("beat") {
                SentimentScore {
                    sentiment: 0.8,
                    confidence: 0.9,
                }
            } else if text.contains("miss") {
                SentimentScore {
                    sentiment: -0.4,
                    confidence: 0.3,
                }
            } else {
                SentimentScore {
                    sentiment: 5.0,
                    confidence: -1.0,
                }
            }
        }
    }

    fn event(day: u32, ticker: &str, text: &str) -> SentimentEvent {
        SentimentEvent {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            ticker: ticker.into(),
            text: text.into(),
        }
    }

    #[test]
    fn no_scores_is_neutral_default() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let d = aggregate_scores(date, "AAPL", &[]);
        assert_eq!(d, DailySentiment::neutral(date, "AAPL"));
    }

    #[test]
    fn single_event_keeps_its_sentiment() {
        let scorer = KeywordScorer::new();
        let daily = aggregate_daily(&[event(1, "AAPL", "earnings beat")], &scorer);
        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].sentiment, 0.8);
        assert_relative_eq!(daily[0].confidence, 0.9);
        assert_eq!(daily[0].news_count, 1);
    }

    #[test]
    fn weighted_mean_uses_confidence_floor() {
        let scorer = KeywordScorer::new();
        let events = [event(1, "AAPL", "beat"), event(1, "AAPL", "miss")];
        let daily = aggregate_daily(&events, &scorer);

        let expected = (0.8 * 1.0 + (-0.4) * 0.4) / (1.0 + 0.4);
        assert_relative_eq!(daily[0].sentiment, expected, epsilon = 1e-12);
        assert_relative_eq!(daily[0].confidence, 0.6, epsilon = 1e-12);
        assert_eq!(daily[0].news_count, 2);
    }

    #[test]
    fn groups_by_date_and_ticker() {
        let scorer = KeywordScorer::new();
        let events = [
            event(2, "AAPL", "beat"),
            event(1, "MSFT", "miss"),
            event(1, "AAPL", "miss"),
            event(2, "AAPL", "miss"),
        ];
        let daily = aggregate_daily(&events, &scorer);
        let keys: Vec<(u32, &str)> = daily
            .iter()
            .map(|d| (chrono::Datelike::day(&d.date), d.ticker.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "AAPL"), (1, "MSFT"), (2, "AAPL")]);
        assert_eq!(daily[2].news_count, 2);
    }

    #[test]
    fn blank_text_skips_scorer() {
        let scorer = KeywordScorer::new();
        let s = score_text(&scorer, "   \n");
        assert_eq!(s, SentimentScore::default());
        assert_eq!(scorer.calls.get(), 0);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let scorer = KeywordScorer::new();
        let s = score_text(&scorer, "something else");
        assert_eq!(s.sentiment, 1.0);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn zero_confidence_events_still_count() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let scores = [
            SentimentScore {
                sentiment: -0.5,
                confidence: 0.0,
            },
            SentimentScore {
                sentiment: 0.5,
                confidence: 0.0,
            },
        ];
        let d = aggregate_scores(date, "AAPL", &scores);
        assert_relative_eq!(d.sentiment, 0.0);
        assert_eq!(d.confidence, 0.0);
        assert_eq!(d.news_count, 2);
    }
}
