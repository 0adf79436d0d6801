//! Daily market bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl MarketBar {
    /// (high - low) / close
    pub fn intraday_range(&self) -> f64 {
        (self.high - self.low) / self.close
    }

    /// (open - prev_close) / prev_close
    pub fn gap(&self, prev_close: f64) -> f64 {
        (self.open - prev_close) / prev_close
    }

    /// close / prev_close - 1
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }

    /// ln(close / prev_close)
    pub fn log_return(&self, prev_close: f64) -> f64 {
        (self.close / prev_close).ln()
    }
}
