//! Lexicon-based sentiment scorer for short financial news snippets.
//!
//! Each token with a lexicon valence contributes to a raw sum, scaled by a
//! preceding booster word and flipped by a negation within the three
//! previous tokens. The sum is squashed into (-1, 1) with
//! `s / sqrt(s^2 + 15)`. Confidence is the absolute compound plus 0.1 per
//! financial term mentioned, capped at 1.

use crate::domain::news::SentimentScore;
use crate::ports::sentiment_port::SentimentScorer;
use std::collections::{HashMap, HashSet};

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const NEGATION_WINDOW: usize = 3;
const FINANCIAL_TERM_WEIGHT: f64 = 0.1;

pub const FINANCIAL_TERMS: [&str; 7] = [
    "earnings", "revenue", "profit", "growth", "margin", "guidance", "outlook",
];

pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: Self::build_valences(),
            boosters: Self::build_boosters(),
            negations: Self::build_negations(),
        }
    }

    fn build_valences() -> HashMap<&'static str, f64> {
        [
            // Positive
            ("beat", 1.6), ("beats", 1.6), ("strong", 2.3), ("stronger", 2.0),
            ("record", 1.5), ("growth", 1.6), ("gain", 2.0), ("gains", 2.0),
            ("surge", 2.2), ("surged", 2.2), ("soar", 2.4), ("soared", 2.4),
            ("rally", 1.9), ("rallied", 1.9), ("upgrade", 1.8), ("upgraded", 1.8),
            ("outperform", 1.9), ("outperformed", 1.9), ("exceeded", 1.7),
            ("raised", 1.2), ("raises", 1.2), ("profit", 1.7), ("profitable", 1.9),
            ("optimistic", 2.0), ("positive", 2.3), ("bullish", 2.2), ("win", 2.8),
            ("wins", 2.7), ("success", 2.7), ("successful", 2.8), ("good", 1.9),
            ("great", 3.1), ("excellent", 3.2), ("robust", 1.6), ("solid", 1.3),
            ("improve", 1.9), ("improved", 2.1), ("improving", 1.8),
            ("confident", 2.2), ("boost", 1.7), ("boosted", 1.5), ("upbeat", 1.9),
            // Negative
            ("miss", -1.4), ("missed", -1.4), ("misses", -1.4), ("weak", -1.9),
            ("weaker", -1.9), ("loss", -1.9), ("losses", -1.9), ("decline", -1.5),
            ("declined", -1.5), ("drop", -1.3), ("dropped", -1.4), ("fall", -1.4),
            ("fell", -1.4), ("plunge", -2.3), ("plunged", -2.3), ("slump", -2.0),
            ("downgrade", -1.8), ("downgraded", -1.8), ("cut", -1.1), ("cuts", -1.1),
            ("lawsuit", -1.7), ("probe", -1.1), ("fraud", -3.0), ("recall", -1.4),
            ("bearish", -2.1), ("negative", -2.7), ("concern", -1.4),
            ("concerns", -1.4), ("risk", -1.1), ("risks", -1.1), ("warning", -1.4),
            ("warns", -1.4), ("bad", -2.5), ("poor", -2.1), ("disappointing", -2.2),
            ("disappointed", -1.9), ("layoffs", -1.8), ("uncertainty", -1.4),
            ("volatile", -1.3), ("slowdown", -1.5), ("bankruptcy", -3.0),
        ]
        .into_iter()
        .collect()
    }

    fn build_boosters() -> HashSet<&'static str> {
        [
            "very", "extremely", "highly", "strongly", "significantly", "sharply",
            "substantially", "really", "hugely", "deeply",
        ]
        .into_iter()
        .collect()
    }

    fn build_negations() -> HashSet<&'static str> {
        [
            "not", "no", "never", "none", "nor", "without", "cannot", "isn't",
            "wasn't", "aren't", "didn't", "doesn't", "don't", "won't", "hasn't",
            "haven't",
        ]
        .into_iter()
        .collect()
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Unnormalized valence sum.
    pub fn raw_valence(&self, text: &str) -> f64 {
        let tokens = Self::tokens(text);
        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                continue;
            };
            let mut v = base;
            if i > 0 && self.boosters.contains(tokens[i - 1].as_str()) {
                v += BOOSTER_INCREMENT * base.signum();
            }
            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|t| self.negations.contains(t.as_str())) {
                v *= NEGATION_SCALAR;
            }
            sum += v;
        }
        sum
    }

    /// Polarity in (-1, 1).
    pub fn compound(&self, text: &str) -> f64 {
        normalize(self.raw_valence(text))
    }
}

fn normalize(sum: f64) -> f64 {
    sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()
}

/// Financial terms present in `text`, matched as case-insensitive substrings.
pub fn financial_term_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    FINANCIAL_TERMS.iter().filter(|t| lower.contains(*t)).count()
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let compound = self.compound(text);
        let k = financial_term_count(text) as f64;
        SentimentScore {
            sentiment: compound,
            confidence: (compound.abs() + FINANCIAL_TERM_WEIGHT * k).min(1.0),
        }
    }
}
