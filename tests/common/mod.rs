#![allow(dead_code)]

use chrono::NaiveDate;
use fusetrader::domain::earnings::EarningsRecord;
use fusetrader::domain::error::FusetraderError;
use fusetrader::domain::market_bar::MarketBar;
use fusetrader::domain::model::ensemble::EnsembleConfig;
use fusetrader::domain::news::{SentimentEvent, SentimentScore};
use fusetrader::domain::strategy::Strategy;
use fusetrader::ports::data_port::DataPort;
use fusetrader::ports::sentiment_port::SentimentScorer;
use std::collections::HashMap;

pub const TICKER: &str = "TEST";

pub struct MockDataPort {
    pub bars: HashMap<String, Vec<MarketBar>>,
    pub events: Vec<SentimentEvent>,
    pub earnings: Vec<EarningsRecord>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            events: Vec::new(),
            earnings: Vec::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<MarketBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_events(mut self, events: Vec<SentimentEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_earnings(mut self, earnings: Vec<EarningsRecord>) -> Self {
        self.earnings = earnings;
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_market(&self, ticker: &str) -> Result<Vec<MarketBar>, FusetraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(FusetraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.get(ticker).cloned().unwrap_or_default())
    }

    fn fetch_sentiment(&self, ticker: &str) -> Result<Vec<SentimentEvent>, FusetraderError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.ticker == ticker)
            .cloned()
            .collect())
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<Vec<EarningsRecord>, FusetraderError> {
        Ok(self
            .earnings
            .iter()
            .filter(|e| e.ticker == ticker)
            .cloned()
            .collect())
    }
}

/// Returns the same score for every non-blank text.
pub struct FixedScorer(pub SentimentScore);

impl FixedScorer {
    pub fn neutral() -> Self {
        Self(SentimentScore::default())
    }
}

impl SentimentScorer for FixedScorer {
    fn score(&self, _text: &str) -> SentimentScore {
        self.0
    }
}

pub fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
}

pub fn make_bar(ticker: &str, offset: usize, close: f64) -> MarketBar {
    MarketBar {
        ticker: ticker.to_string(),
        date: day(offset),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 10_000.0 + (offset % 7) as f64 * 500.0,
    }
}

pub fn bars_from_closes(ticker: &str, closes: &[f64]) -> Vec<MarketBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, i, c))
        .collect()
}

pub fn flat_bars(ticker: &str, n: usize, price: f64) -> Vec<MarketBar> {
    (0..n)
        .map(|i| MarketBar {
            ticker: ticker.to_string(),
            date: day(i),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
        })
        .collect()
}

/// Deterministic oscillating series with drift.
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 4.0 * (t * 0.35).sin() + 1.5 * (t * 1.7).cos()
        })
        .collect()
}

pub fn quarterly_earnings(ticker: &str, quarters: usize) -> Vec<EarningsRecord> {
    (0..quarters)
        .map(|q| EarningsRecord {
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
                + chrono::Duration::days(q as i64 * 91),
            ticker: ticker.to_string(),
            quarter: format!("Q{}", q % 4 + 1),
            revenue: 1000.0 + 25.0 * q as f64,
            net_income: 100.0 + 4.0 * q as f64,
            revenue_growth: 0.02,
            margin: 0.1,
        })
        .collect()
}

pub fn quick_strategy() -> Strategy {
    Strategy {
        ticker: TICKER.to_string(),
        data: Default::default(),
        signal: Default::default(),
        risk: Default::default(),
        model: EnsembleConfig {
            forest_trees: 12,
            forest_max_depth: 5,
            boosting_estimators: 15,
            boosting_max_depth: 3,
            cv_splits: 3,
            ..EnsembleConfig::default()
        },
    }
}
