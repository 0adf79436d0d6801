//! CSV file data adapter.
//!
//! Reads three headered tables: market bars
//! (`date,ticker,open,high,low,close,volume`), sentiment events
//! (`date,ticker,text`) and earnings
//! (`date,ticker,quarter,revenue,net_income,revenue_growth,margin`).
//! Dates are `YYYY-MM-DD`. Blank earnings figures load as NaN. The market
//! file is required; a missing sentiment or earnings file reads as empty.

use crate::domain::earnings::EarningsRecord;
use crate::domain::error::FusetraderError;
use crate::domain::market_bar::MarketBar;
use crate::domain::news::SentimentEvent;
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct MarketCsvRow {
    date: String,
    ticker: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SentimentCsvRow {
    date: String,
    ticker: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EarningsCsvRow {
    date: String,
    ticker: String,
    #[serde(default)]
    quarter: String,
    #[serde(default)]
    revenue: Option<f64>,
    #[serde(default)]
    net_income: Option<f64>,
    #[serde(default)]
    revenue_growth: Option<f64>,
    #[serde(default)]
    margin: Option<f64>,
}

pub struct CsvAdapter {
    market_path: PathBuf,
    sentiment_path: PathBuf,
    earnings_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(market_path: PathBuf, sentiment_path: PathBuf, earnings_path: PathBuf) -> Self {
        Self {
            market_path,
            sentiment_path,
            earnings_path,
        }
    }

    pub fn from_strategy(strategy: &Strategy) -> Self {
        Self::new(
            strategy.market_path(),
            strategy.sentiment_path(),
            strategy.earnings_path(),
        )
    }
}

fn parse_date(raw: &str, path: &Path, line: usize) -> Result<NaiveDate, FusetraderError> {
    // Accept timestamps like "2024-01-15 00:00:00" by taking the date part.
    let day = raw.trim().split([' ', 'T']).next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| FusetraderError::Data {
        reason: format!(
            "{} line {}: invalid date {:?}: {}",
            path.display(),
            line,
            raw,
            e
        ),
    })
}

/// `Ok(None)` when the file does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, FusetraderError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FusetraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        }),
    }
}

/// Deserialize every record, tagging errors with file and line.
fn read_rows<T: DeserializeOwned>(content: &str, path: &Path) -> Result<Vec<(usize, T)>, FusetraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = result.map_err(|e| FusetraderError::Data {
            reason: format!("{} line {}: CSV parse error: {}", path.display(), line, e),
        })?;
        rows.push((line, row));
    }
    Ok(rows)
}

impl DataPort for CsvAdapter {
    fn fetch_market(&self, ticker: &str) -> Result<Vec<MarketBar>, FusetraderError> {
        let path = &self.market_path;
        let content = fs::read_to_string(path).map_err(|e| FusetraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut bars = Vec::new();
        for (line, row) in read_rows::<MarketCsvRow>(&content, path)? {
            if row.ticker != ticker {
                continue;
            }
            bars.push(MarketBar {
                date: parse_date(&row.date, path, line)?,
                ticker: row.ticker,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_sentiment(&self, ticker: &str) -> Result<Vec<SentimentEvent>, FusetraderError> {
        let path = &self.sentiment_path;
        let Some(content) = read_optional(path)? else {
            warn!(path = %path.display(), "sentiment file not found, using neutral sentiment");
            return Ok(Vec::new());
        };

        let mut events = Vec::new();
        for (line, row) in read_rows::<SentimentCsvRow>(&content, path)? {
            if row.ticker != ticker {
                continue;
            }
            events.push(SentimentEvent {
                date: parse_date(&row.date, path, line)?,
                ticker: row.ticker,
                text: row.text,
            });
        }
        Ok(events)
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<Vec<EarningsRecord>, FusetraderError> {
        let path = &self.earnings_path;
        let Some(content) = read_optional(path)? else {
            warn!(path = %path.display(), "earnings file not found, earnings features disabled");
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (line, row) in read_rows::<EarningsCsvRow>(&content, path)? {
            if row.ticker != ticker {
                continue;
            }
            records.push(EarningsRecord {
                date: parse_date(&row.date, path, line)?,
                ticker: row.ticker,
                quarter: row.quarter,
                revenue: row.revenue.unwrap_or(f64::NAN),
                net_income: row.net_income.unwrap_or(f64::NAN),
                revenue_growth: row.revenue_growth.unwrap_or(f64::NAN),
                margin: row.margin.unwrap_or(f64::NAN),
            });
        }
        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}
