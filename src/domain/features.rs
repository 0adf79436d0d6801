//! Feature assembly: joins indicators, daily sentiment, and forward-filled
//! earnings into one aligned row per trading day, plus prediction targets.

use crate::domain::earnings::{self, EarningsRecord, EarningsSnapshot};
use crate::domain::indicator_engine::IndicatorTable;
use crate::domain::error::FusetraderError;
use crate::domain::news::DailySentiment;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Absolute next-day return above which a move counts as strong.
pub const STRONG_MOVE_THRESHOLD: f64 = 0.02;

pub const SENTIMENT_COLUMNS: [&str; 3] = ["sentiment", "sentiment_confidence", "news_count"];

pub const EARNINGS_COLUMNS: [&str; 5] = [
    "revenue",
    "net_income",
    "revenue_growth_yoy",
    "income_growth_yoy",
    "margin",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    /// Model inputs, aligned with [`FeatureTable::feature_names`].
    pub values: Vec<f64>,
    pub sentiment: f64,
    pub sentiment_confidence: f64,
    pub news_count: usize,
    /// Simple return from this row's close to the next bar's close.
    pub target_next_return: f64,
    pub direction: bool,
    pub strong_move: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    pub ticker: String,
    pub feature_names: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.values.clone()).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.target_next_return).collect()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// `None` until YoY growth exists, or when a reported figure is missing.
fn earnings_values(snapshot: &EarningsSnapshot) -> Option<[f64; 5]> {
    let values = [
        snapshot.revenue,
        snapshot.net_income,
        snapshot.revenue_growth_yoy?,
        snapshot.income_growth_yoy?,
        snapshot.margin,
    ];
    values.iter().all(|v| v.is_finite()).then_some(values)
}

/// Build the feature table for `ticker`.
///
/// Sentiment is left-joined on date with the zero/zero/zero default.
/// Earnings columns are present only when the ticker has earnings; rows
/// before the first report with complete YoY growth, and rows whose
/// quarter has a missing figure, are dropped. The final
/// indicator row has no next-day target and is always dropped.
pub fn assemble_features(
    indicators: &IndicatorTable,
    ticker: &str,
    daily_sentiment: &[DailySentiment],
    earnings_records: &[EarningsRecord],
) -> Result<FeatureTable, FusetraderError> {
    let return_col = indicators
        .column_index("return")
        .ok_or_else(|| FusetraderError::FeatureEngineering {
            reason: "indicator table has no return column".into(),
        })?;

    let sentiment_by_date: HashMap<NaiveDate, &DailySentiment> = daily_sentiment
        .iter()
        .filter(|d| d.ticker == ticker)
        .map(|d| (d.date, d))
        .collect();

    let snapshots = earnings::build_snapshots(earnings_records, ticker);
    let with_earnings = !snapshots.is_empty();

    let mut feature_names = indicators.names.clone();
    feature_names.extend(SENTIMENT_COLUMNS.iter().map(|s| s.to_string()));
    if with_earnings {
        feature_names.extend(EARNINGS_COLUMNS.iter().map(|s| s.to_string()));
    }

    let mut rows = Vec::with_capacity(indicators.len().saturating_sub(1));
    let mut dropped_for_earnings = 0usize;

    for pair in indicators.rows.windows(2) {
        let (row, next) = (&pair[0], &pair[1]);

        let (sentiment, sentiment_confidence, news_count) = match sentiment_by_date.get(&row.date)
        {
            Some(d) => (d.sentiment, d.confidence, d.news_count),
            None => (0.0, 0.0, 0),
        };

        let mut values = row.values.clone();
        values.extend([sentiment, sentiment_confidence, news_count as f64]);

        if with_earnings {
            match earnings::as_of(&snapshots, row.date).and_then(earnings_values) {
                Some(e) => values.extend(e),
                None => {
                    dropped_for_earnings += 1;
                    continue;
                }
            }
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(FusetraderError::FeatureEngineering {
                reason: format!("non-finite feature value on {}", row.date),
            });
        }

        let target = next.values[return_col];
        rows.push(FeatureRow {
            date: row.date,
            close: row.close,
            values,
            sentiment,
            sentiment_confidence,
            news_count,
            target_next_return: target,
            direction: target > 0.0,
            strong_move: target.abs() > STRONG_MOVE_THRESHOLD,
        });
    }

    if dropped_for_earnings > 0 {
        debug!(
            ticker,
            dropped = dropped_for_earnings,
            "rows dropped for missing earnings values"
        );
    }

    Ok(FeatureTable {
        ticker: ticker.to_string(),
        feature_names,
        rows,
    })
}
