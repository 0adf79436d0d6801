//! Trade decisions from predictions and sentiment.
//!
//! ```text
//! score = predicted_return * confidence
//!       + sentiment * sentiment_weight * sentiment_confidence
//! ```
//! Decision order: low confidence holds, then buy above the buy threshold,
//! sell below the sell threshold, hold otherwise.

use crate::domain::error::FusetraderError;
use crate::domain::features::FeatureRow;
use crate::domain::model::ensemble::PredictionRecord;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
    Hold,
    /// Forced exit applied by the backtest; never produced by [`decide`].
    Close,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => f.pad("BUY"),
            Action::Sell => f.pad("SELL"),
            Action::Hold => f.pad("HOLD"),
            Action::Close => f.pad("CLOSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub sentiment_weight: f64,
    pub confidence_threshold: f64,
    pub max_position_size: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            buy_threshold: 0.003,
            sell_threshold: -0.003,
            sentiment_weight: 0.3,
            confidence_threshold: 0.002,
            max_position_size: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub score: f64,
    /// Signed fraction of the notional portfolio, in [-1, 1].
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub action: Action,
    pub score: f64,
    pub position_size: f64,
    pub predicted_return: f64,
    pub confidence: f64,
}

pub fn combined_score(
    predicted_return: f64,
    confidence: f64,
    sentiment: f64,
    sentiment_confidence: f64,
    sentiment_weight: f64,
) -> f64 {
    predicted_return * confidence + sentiment * sentiment_weight * sentiment_confidence
}

pub fn decide(
    predicted_return: f64,
    confidence: f64,
    sentiment: f64,
    sentiment_confidence: f64,
    config: &SignalConfig,
) -> Decision {
    let score = combined_score(
        predicted_return,
        confidence,
        sentiment,
        sentiment_confidence,
        config.sentiment_weight,
    );

    let hold = Decision {
        action: Action::Hold,
        score,
        size: 0.0,
    };
    if confidence < config.confidence_threshold {
        return hold;
    }

    let size = (confidence * config.max_position_size).min(config.max_position_size);
    if score > config.buy_threshold {
        Decision {
            action: Action::Buy,
            score,
            size,
        }
    } else if score < config.sell_threshold {
        Decision {
            action: Action::Sell,
            score,
            size: -size,
        }
    } else {
        hold
    }
}

/// Apply [`decide`] to every held-out row. Predictions must be aligned
/// one-to-one with `rows` by date.
pub fn generate_signals(
    rows: &[FeatureRow],
    predictions: &[PredictionRecord],
    config: &SignalConfig,
) -> Result<Vec<Signal>, FusetraderError> {
    if rows.len() != predictions.len() {
        return Err(FusetraderError::SignalGeneration {
            reason: format!(
                "{} feature rows but {} predictions",
                rows.len(),
                predictions.len()
            ),
        });
    }

    rows.iter()
        .zip(predictions)
        .map(|(row, pred)| {
            if row.date != pred.date {
                return Err(FusetraderError::SignalGeneration {
                    reason: format!("prediction for {} paired with row {}", pred.date, row.date),
                });
            }
            if !pred.predicted_return.is_finite() || !pred.confidence.is_finite() {
                return Err(FusetraderError::SignalGeneration {
                    reason: format!("non-finite prediction on {}", pred.date),
                });
            }
            let d = decide(
                pred.predicted_return,
                pred.confidence,
                row.sentiment,
                row.sentiment_confidence,
                config,
            );
            Ok(Signal {
                date: row.date,
                action: d.action,
                score: d.score,
                position_size: d.size,
                predicted_return: pred.predicted_return,
                confidence: pred.confidence,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> SignalConfig {
        SignalConfig::default()
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Buy.to_string(), "BUY");
        assert_eq!(Action::Close.to_string(), "CLOSE");
    }

    #[test]
    fn low_confidence_holds_even_with_strong_score() {
        let config = SignalConfig {
            confidence_threshold: 0.5,
            ..cfg()
        };
        // score = 1.0 * 0.4 + 1.0 * 0.3 * 1.0 far above the buy threshold
        let d = decide(1.0, 0.4, 1.0, 1.0, &config);
        assert_eq!(d.action, Action::Hold);
        assert_eq!(d.size, 0.0);
        assert_relative_eq!(d.score, 0.7);
    }

    #[test]
    fn buy_sized_by_confidence() {
        let d = decide(0.01, 0.5, 0.0, 0.0, &cfg());
        assert_eq!(d.action, Action::Buy);
        assert_relative_eq!(d.score, 0.005);
        assert_relative_eq!(d.size, 0.05);
    }

    #[test]
    fn size_never_exceeds_max() {
        let d = decide(0.01, 1.0, 0.0, 0.0, &cfg());
        assert_relative_eq!(d.size, 0.1);
    }

    #[test]
    fn sell_has_negative_size() {
        let d = decide(-0.01, 0.8, 0.0, 0.0, &cfg());
        assert_eq!(d.action, Action::Sell);
        assert_relative_eq!(d.size, -0.08);
    }

    #[test]
    fn sentiment_alone_can_trigger() {
        // 0.0 * 1.0 + 0.5 * 0.3 * 0.1 = 0.015
        let d = decide(0.0, 1.0, 0.5, 0.1, &cfg());
        assert_eq!(d.action, Action::Buy);
    }

    #[test]
    fn zero_confidence_sentiment_is_ignored() {
        let d = decide(0.0, 1.0, 0.9, 0.0, &cfg());
        assert_eq!(d.action, Action::Hold);
        assert_eq!(d.score, 0.0);
    }

    #[test]
    fn inside_band_holds() {
        let d = decide(0.002, 1.0, 0.0, 0.0, &cfg());
        assert_eq!(d.action, Action::Hold);
        assert_eq!(d.size, 0.0);
    }

    fn row(day: u32) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            close: 100.0,
            values: vec![],
            sentiment: 0.0,
            sentiment_confidence: 0.0,
            news_count: 0,
            target_next_return: 0.0,
            direction: false,
            strong_move: false,
        }
    }

    fn pred(day: u32, predicted_return: f64) -> PredictionRecord {
        PredictionRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            predicted_return,
            confidence: 1.0,
        }
    }

    #[test]
    fn generates_one_signal_per_row() {
        let signals =
            generate_signals(&[row(1), row(2)], &[pred(1, 0.01), pred(2, -0.01)], &cfg()).unwrap();
        assert_eq!(signals[0].action, Action::Buy);
        assert_eq!(signals[1].action, Action::Sell);
        assert_eq!(signals[1].date, row(2).date);
    }

    #[test]
    fn misaligned_predictions_fail() {
        assert!(matches!(
            generate_signals(&[row(1)], &[], &cfg()),
            Err(FusetraderError::SignalGeneration { .. })
        ));
        assert!(matches!(
            generate_signals(&[row(1)], &[pred(2, 0.0)], &cfg()),
            Err(FusetraderError::SignalGeneration { .. })
        ));
    }

    #[test]
    fn non_finite_prediction_fails() {
        assert!(generate_signals(&[row(1)], &[pred(1, f64::NAN)], &cfg()).is_err());
    }
}
